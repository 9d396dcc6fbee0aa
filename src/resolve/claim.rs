//! Per-package claim tracking.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::runtime::is_path_under;

use super::ResolveError;

/// Tracks, for one package name, every distinct source path asserted for
/// it and which files made each assertion.
///
/// At most one asserting file may be marked as the package's canonical
/// source (the manifest that defines the package, as opposed to an
/// override pointing at it).
#[derive(Debug)]
pub struct PathClaim {
    name: String,
    targets: BTreeMap<PathBuf, Vec<PathBuf>>,
    canonical_source: Option<PathBuf>,
}

impl PathClaim {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            targets: BTreeMap::new(),
            canonical_source: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record a claim that this package's source lives at `path`.
    ///
    /// The asserting file is appended to the path's claimant list in
    /// arrival order; repeated identical assertions are kept, not
    /// deduplicated.
    pub fn add(&mut self, path: impl Into<PathBuf>, source_file: impl Into<PathBuf>) {
        self.targets
            .entry(path.into())
            .or_default()
            .push(source_file.into());
    }

    /// Record a claim from the package's own manifest and mark that
    /// manifest as the canonical source.
    ///
    /// Fails without mutating any state if a canonical source was already
    /// recorded: two manifests declaring the same package name means the
    /// scanner fed us garbage, and the pass must abort.
    pub fn add_canonical(
        &mut self,
        path: impl Into<PathBuf>,
        source_file: impl Into<PathBuf>,
    ) -> Result<(), ResolveError> {
        let source_file = source_file.into();
        if let Some(existing) = &self.canonical_source {
            return Err(ResolveError::DoubleCanonical {
                package: self.name.clone(),
                existing: existing.clone(),
                attempted: source_file,
            });
        }
        self.add(path, source_file.clone());
        self.canonical_source = Some(source_file);
        Ok(())
    }

    /// True when two or more distinct source paths have been claimed.
    pub fn has_conflict(&self) -> bool {
        self.targets.len() > 1
    }

    /// True when any asserting file lies under `home_root`.
    ///
    /// Used to flag conflicts that implicate the managed tree itself
    /// rather than only third-party checkouts.
    pub fn affects_managed_tree(&self, home_root: &Path) -> bool {
        self.targets
            .values()
            .flatten()
            .any(|source| is_path_under(source, home_root))
    }

    /// The single agreed-upon source path.
    ///
    /// Callers must check [`has_conflict`](Self::has_conflict) first;
    /// asking for a single target while claims disagree is a contract
    /// violation and fails rather than silently picking one.
    pub fn target(&self) -> Result<&Path, ResolveError> {
        match self.targets.keys().next() {
            Some(path) if self.targets.len() == 1 => Ok(path),
            _ => Err(ResolveError::UnresolvedConflict {
                package: self.name.clone(),
            }),
        }
    }

    /// Render the conflicting claims as a human-readable, deterministic
    /// multi-line description.
    ///
    /// Targets are ordered by descending claimant count, ties broken
    /// lexicographically by path. Each target lists its asserting files in
    /// arrival order; when the canonical source is among them, a trailing
    /// line identifies it as the authoritative definition.
    pub fn describe_conflict(&self) -> String {
        let mut ordered: Vec<(&PathBuf, &Vec<PathBuf>)> = self.targets.iter().collect();
        ordered.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));

        let mut out = String::new();
        for (path, sources) in ordered {
            let noun = if sources.len() == 1 { "claim" } else { "claims" };
            let _ = writeln!(out, "{} ({} {})", path.display(), sources.len(), noun);
            for source in sources {
                let _ = writeln!(out, "  asserted by {}", source.display());
            }
            if let Some(canonical) = &self.canonical_source
                && sources.contains(canonical)
            {
                let _ = writeln!(out, "  authoritative definition: {}", canonical.display());
            }
        }
        out
    }
}
