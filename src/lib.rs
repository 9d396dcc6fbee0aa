pub mod analyzer;
pub mod application;
pub mod package;
pub mod resolve;
pub mod runtime;
