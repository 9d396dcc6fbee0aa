//! Registry aggregating per-package claims across one reconciliation pass.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{Conflicts, PathClaim, ResolveError};

/// The successful outcome of a reconciliation pass: one unambiguous
/// source path per package name.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub packages: BTreeMap<String, PathBuf>,
}

impl Resolution {
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Owns one [`PathClaim`] per package name and answers aggregate queries.
///
/// Usage is strictly two-phase: the scanner feeds every discovered claim
/// via [`add`](Self::add) / [`add_canonical`](Self::add_canonical), then
/// the caller checks [`has_conflicts`](Self::has_conflicts) before ever
/// asking for the resolved map.
#[derive(Debug)]
pub struct DependencyRegistry {
    entries: BTreeMap<String, PathClaim>,
    home_root: PathBuf,
}

impl DependencyRegistry {
    /// Create a registry for one pass. `home_root` designates the managed
    /// tree used by the containment queries.
    pub fn new(home_root: impl Into<PathBuf>) -> Self {
        Self {
            entries: BTreeMap::new(),
            home_root: home_root.into(),
        }
    }

    pub fn home_root(&self) -> &Path {
        &self.home_root
    }

    /// Number of distinct package names seen so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn claim_mut(&mut self, name: &str) -> &mut PathClaim {
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| PathClaim::new(name))
    }

    /// Record a claim from the package's own manifest.
    pub fn add_canonical(
        &mut self,
        name: &str,
        path: impl Into<PathBuf>,
        source_file: impl Into<PathBuf>,
    ) -> Result<(), ResolveError> {
        self.claim_mut(name).add_canonical(path, source_file)
    }

    /// Record a claim from a dependency-override file.
    pub fn add(&mut self, name: &str, path: impl Into<PathBuf>, source_file: impl Into<PathBuf>) {
        self.claim_mut(name).add(path, source_file);
    }

    /// True when any package has two or more distinct claimed paths.
    pub fn has_conflicts(&self) -> bool {
        self.entries.values().any(PathClaim::has_conflict)
    }

    /// True when any conflicting package has an asserting file inside the
    /// managed tree.
    pub fn affects_managed_tree(&self) -> bool {
        self.entries
            .values()
            .filter(|claim| claim.has_conflict())
            .any(|claim| claim.affects_managed_tree(&self.home_root))
    }

    /// Concatenated [`PathClaim::describe_conflict`] output for every
    /// conflicting package, each preceded by a header naming the package.
    ///
    /// Packages appear in name order, so identical input always produces
    /// byte-identical text.
    pub fn generate_conflict_report(&self) -> String {
        let mut out = String::new();
        for (name, claim) in &self.entries {
            if !claim.has_conflict() {
                continue;
            }
            let _ = writeln!(out, "package {}:", name);
            for line in claim.describe_conflict().lines() {
                let _ = writeln!(out, "  {}", line);
            }
        }
        out
    }

    /// The final name→path map.
    ///
    /// Callers must have verified [`has_conflicts`](Self::has_conflicts)
    /// is false; with an outstanding conflict this fails on the first
    /// conflicting package instead of silently picking a target.
    pub fn resolved_map(&self) -> Result<BTreeMap<String, PathBuf>, ResolveError> {
        let mut map = BTreeMap::new();
        for (name, claim) in &self.entries {
            map.insert(name.clone(), claim.target()?.to_path_buf());
        }
        Ok(map)
    }

    /// Consume the registry after ingestion: the resolved map on success,
    /// or the structured conflict failure carrying the full report text
    /// and the managed-tree flag.
    pub fn finish(self) -> Result<Resolution> {
        if self.has_conflicts() {
            return Err(Conflicts {
                report: self.generate_conflict_report(),
                affects_managed_tree: self.affects_managed_tree(),
            }
            .into());
        }
        let packages = self.resolved_map()?;
        Ok(Resolution { packages })
    }
}
