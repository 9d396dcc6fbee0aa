//! Package tree scanning.
//!
//! Walks a multi-package source tree, parses package manifests and
//! dependency-override files, and feeds every discovered claim into the
//! reconciliation registry.

mod discovery;
mod manifest;
mod overrides;

pub use discovery::{ScanOptions, scan_tree};
pub use manifest::{MANIFEST_FILE, Manifest};
pub use overrides::{OVERRIDES_FILE, OverrideEntry, parse_overrides};
