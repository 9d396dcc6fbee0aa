//! Package manifest (`pkg.json`) parsing.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::runtime::{Runtime, normalize_path};

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "pkg.json";

/// A package's own declaration of its name and source directory.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Manifest {
    pub name: String,
    /// Source directory relative to the manifest's directory.
    #[serde(default = "default_lib")]
    pub lib: String,
}

fn default_lib() -> String {
    "lib".to_string()
}

impl Manifest {
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read manifest {:?}", path))?;
        let manifest: Manifest = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest {:?}", path))?;
        if manifest.name.is_empty() {
            bail!("Manifest {:?} declares an empty package name", path);
        }
        Ok(manifest)
    }

    /// The canonical source directory this manifest declares: its own
    /// directory joined with `lib`, lexically normalized.
    pub fn lib_dir(&self, manifest_path: &Path) -> PathBuf {
        let dir = manifest_path.parent().unwrap_or_else(|| Path::new(""));
        normalize_path(&dir.join(&self.lib))
    }
}
