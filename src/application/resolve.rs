//! Resolve action - produces the final name→path map.

use anyhow::Result;
use std::path::Path;

use crate::resolve::{Resolution, write_map_file};
use crate::runtime::Runtime;

use super::{PassConfig, build_registry};

/// Resolve action - scans the tree and reconciles all claims.
pub struct ResolveAction<'a, R: Runtime> {
    runtime: &'a R,
    config: PassConfig,
}

impl<'a, R: Runtime> ResolveAction<'a, R> {
    pub fn new(runtime: &'a R, config: PassConfig) -> Self {
        Self { runtime, config }
    }

    /// Run the pass. Conflicts surface as a
    /// [`Conflicts`](crate::resolve::Conflicts) error carrying the full
    /// report.
    #[tracing::instrument(skip(self))]
    pub fn resolve(&self) -> Result<Resolution> {
        build_registry(self.runtime, &self.config)?.finish()
    }

    /// Run the pass and write the map file.
    pub fn resolve_to_file(&self, output: &Path, relative: bool) -> Result<Resolution> {
        let resolution = self.resolve()?;
        write_map_file(self.runtime, output, &resolution, relative)?;
        Ok(resolution)
    }
}
