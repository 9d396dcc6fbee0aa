//! Recursive package discovery and claim ingestion.

use anyhow::{Context, Result, bail};
use log::debug;
use std::path::{Component, Path};

use crate::resolve::DependencyRegistry;
use crate::runtime::{Runtime, resolve_assertion};

use super::{MANIFEST_FILE, Manifest, OVERRIDES_FILE, parse_overrides};

/// Scanner configuration.
#[derive(Debug, Default)]
pub struct ScanOptions {
    /// Package name whose override assertions are exempted unless they
    /// escape the asserting directory (see [`scan_tree`]).
    pub self_package: Option<String>,
    /// Directory names to skip, matched as glob patterns.
    pub excludes: Vec<glob::Pattern>,
}

/// Walk `root` and feed every discovered claim into `registry`.
///
/// Each directory is processed manifest-first: a `pkg.json` registers a
/// canonical claim for its declared name, then a `.pkgpaths` registers one
/// claim per entry. Child directories are visited in sorted order; hidden
/// directories and names matching an exclude pattern are skipped.
///
/// Entries for the designated self package are ignored unless the raw
/// asserted path starts with a `..` component. A plain relative override
/// of the self package is a transitively pulled-in redefinition, not a
/// deliberate local pin, and must not register as a false conflict.
#[tracing::instrument(skip(runtime, registry))]
pub fn scan_tree<R: Runtime>(
    runtime: &R,
    root: &Path,
    options: &ScanOptions,
    registry: &mut DependencyRegistry,
) -> Result<()> {
    if !runtime.is_dir(root) {
        bail!("Scan root {:?} is not a directory", root);
    }
    scan_dir(runtime, root, options, registry)
}

fn scan_dir<R: Runtime>(
    runtime: &R,
    dir: &Path,
    options: &ScanOptions,
    registry: &mut DependencyRegistry,
) -> Result<()> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if runtime.exists(&manifest_path) {
        let manifest = Manifest::load(runtime, &manifest_path)?;
        let lib_dir = manifest.lib_dir(&manifest_path);
        debug!(
            "manifest {} defines package '{}' at {}",
            manifest_path.display(),
            manifest.name,
            lib_dir.display()
        );
        registry.add_canonical(&manifest.name, lib_dir, manifest_path.clone())?;
    }

    let overrides_path = dir.join(OVERRIDES_FILE);
    if runtime.exists(&overrides_path) {
        let content = runtime
            .read_to_string(&overrides_path)
            .with_context(|| format!("Failed to read override file {:?}", overrides_path))?;
        for entry in parse_overrides(&content, &overrides_path)? {
            if let Some(self_package) = &options.self_package
                && entry.name == *self_package
                && !starts_with_parent_dir(&entry.raw_path)
            {
                debug!(
                    "{}: ignoring override for self package '{}' ({})",
                    overrides_path.display(),
                    entry.name,
                    entry.raw_path
                );
                continue;
            }
            let path = resolve_assertion(dir, Path::new(&entry.raw_path));
            debug!(
                "{} claims package '{}' at {}",
                overrides_path.display(),
                entry.name,
                path.display()
            );
            registry.add(&entry.name, path, overrides_path.clone());
        }
    }

    let mut children = runtime
        .read_dir(dir)
        .with_context(|| format!("Failed to list directory {:?}", dir))?;
    children.sort();

    for child in children {
        if !runtime.is_dir(&child) {
            continue;
        }
        let Some(name) = child.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if options.excludes.iter().any(|pattern| pattern.matches(name)) {
            debug!("skipping excluded directory {}", child.display());
            continue;
        }
        scan_dir(runtime, &child, options, registry)?;
    }

    Ok(())
}

/// The literal exemption boundary: only a leading `..` component counts as
/// escaping the asserting directory. `./../x` and absolute paths do not.
fn starts_with_parent_dir(raw_path: &str) -> bool {
    Path::new(raw_path).components().next() == Some(Component::ParentDir)
}
