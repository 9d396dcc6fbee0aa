//! Application layer - use cases composing the scanner, the registry, and
//! the emitters.

mod analyze;
mod check;
mod resolve;

pub use analyze::AnalyzeAction;
pub use check::{CheckAction, CheckOutcome};
pub use resolve::ResolveAction;

use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::package::{ScanOptions, scan_tree};
use crate::resolve::DependencyRegistry;
use crate::runtime::Runtime;

/// Shared configuration for one reconciliation pass.
#[derive(Debug, Default)]
pub struct PassConfig {
    /// Root directory of the source tree to scan.
    pub root: PathBuf,
    /// Managed tree root; defaults to the scan root.
    pub home_root: Option<PathBuf>,
    pub scan: ScanOptions,
}

/// Run the ingestion phase: canonicalize the roots, walk the tree, and
/// return the populated registry ready for queries.
pub(crate) fn build_registry<R: Runtime>(
    runtime: &R,
    config: &PassConfig,
) -> Result<DependencyRegistry> {
    let root = runtime
        .canonicalize(&config.root)
        .with_context(|| format!("Failed to locate scan root {:?}", config.root))?;
    let home_root = match &config.home_root {
        Some(home) => runtime
            .canonicalize(home)
            .with_context(|| format!("Failed to locate home root {:?}", home))?,
        None => root.clone(),
    };
    debug!(
        "scanning {} (home root {})",
        root.display(),
        home_root.display()
    );

    let mut registry = DependencyRegistry::new(home_root);
    scan_tree(runtime, &root, &config.scan, &mut registry)?;
    debug!("ingested claims for {} packages", registry.len());
    Ok(registry)
}
