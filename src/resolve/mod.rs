//! Dependency reconciliation engine.
//!
//! Reconciles competing claims about where each named package's source
//! code lives. Claims are fed in by the scanner ([`crate::package`]); once
//! ingestion completes, the registry answers conflict queries and, when
//! the claims agree, yields the final name→path resolution handed to the
//! downstream analyzer.

mod claim;
mod map_file;
mod registry;

pub use claim::PathClaim;
pub use map_file::{render_map, write_map_file};
pub use registry::{DependencyRegistry, Resolution};

use std::path::PathBuf;

/// Contract violations inside a reconciliation pass.
///
/// Both variants indicate a bug in the feeding/querying code rather than
/// bad user input: they abort the pass instead of being reported like
/// ordinary package conflicts.
#[derive(Debug)]
pub enum ResolveError {
    /// A second manifest declared itself the definition of an
    /// already-defined package. The scanner must call `add_canonical` at
    /// most once per package name.
    DoubleCanonical {
        package: String,
        existing: PathBuf,
        attempted: PathBuf,
    },
    /// `target()` or `resolved_map()` was invoked while a conflict is
    /// outstanding. Callers must check `has_conflict(s)` first.
    UnresolvedConflict { package: String },
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::DoubleCanonical {
                package,
                existing,
                attempted,
            } => {
                write!(
                    f,
                    "Package '{}' already has a canonical definition in {}; refusing a second one from {}",
                    package,
                    existing.display(),
                    attempted.display()
                )
            }
            ResolveError::UnresolvedConflict { package } => {
                write!(
                    f,
                    "Package '{}' has conflicting source paths and cannot be resolved to a single location",
                    package
                )
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// The expected user-facing failure: one or more packages resolve to two
/// or more distinct source paths.
///
/// Carries the full deterministic report text and whether any conflicting
/// claim originates inside the managed tree, so the caller can word its
/// remediation advice accordingly.
#[derive(Debug)]
pub struct Conflicts {
    pub report: String,
    pub affects_managed_tree: bool,
}

impl std::fmt::Display for Conflicts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conflicting package source paths:\n{}", self.report)
    }
}

impl std::error::Error for Conflicts {}
