//! Check action - reports conflicts without producing a map.

use anyhow::Result;

use crate::resolve::Conflicts;
use crate::runtime::Runtime;

use super::{PassConfig, build_registry};

/// Outcome of a conflict check.
#[derive(Debug)]
pub enum CheckOutcome {
    /// Every package resolves to a single source path.
    Clean { package_count: usize },
    /// At least one package has competing source paths.
    Conflicting(Conflicts),
}

/// Check action - scans the tree and queries the registry for conflicts.
pub struct CheckAction<'a, R: Runtime> {
    runtime: &'a R,
    config: PassConfig,
}

impl<'a, R: Runtime> CheckAction<'a, R> {
    pub fn new(runtime: &'a R, config: PassConfig) -> Self {
        Self { runtime, config }
    }

    /// Run the pass. A conflicting tree is a normal outcome here, not an
    /// error; plumbing failures (unreadable files, bad manifests) still
    /// propagate as errors.
    #[tracing::instrument(skip(self))]
    pub fn check(&self) -> Result<CheckOutcome> {
        let registry = build_registry(self.runtime, &self.config)?;
        if registry.has_conflicts() {
            Ok(CheckOutcome::Conflicting(Conflicts {
                report: registry.generate_conflict_report(),
                affects_managed_tree: registry.affects_managed_tree(),
            }))
        } else {
            Ok(CheckOutcome::Clean {
                package_count: registry.len(),
            })
        }
    }
}
