//! File system operations (read, write, directory).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn read_to_string_impl(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context("Failed to read file to string")
    }

    #[tracing::instrument(skip(self, contents))]
    pub(crate) fn write_impl(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents).context("Failed to write to file")?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn create_dir_all_impl(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).context("Failed to create directory")?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn exists_impl(&self, path: &Path) -> bool {
        path.exists()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn is_dir_impl(&self, path: &Path) -> bool {
        path.is_dir()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_dir_impl(&self, path: &Path) -> Result<Vec<PathBuf>> {
        fs::read_dir(path)?.map(|entry| Ok(entry?.path())).collect()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn canonicalize_impl(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("Failed to canonicalize {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use tempfile::tempdir;

    #[test]
    fn test_real_runtime_read_write_roundtrip() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let file = dir.path().join("sub").join("note.txt");

        runtime.create_dir_all(file.parent().unwrap()).unwrap();
        runtime.write(&file, b"hello").unwrap();

        assert!(runtime.exists(&file));
        assert!(!runtime.is_dir(&file));
        assert_eq!(runtime.read_to_string(&file).unwrap(), "hello");
    }

    #[test]
    fn test_real_runtime_read_dir_lists_entries() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        runtime.write(&dir.path().join("a"), b"").unwrap();
        runtime.write(&dir.path().join("b"), b"").unwrap();

        let mut entries = runtime.read_dir(dir.path()).unwrap();
        entries.sort();
        assert_eq!(entries, vec![dir.path().join("a"), dir.path().join("b")]);
    }

    #[test]
    fn test_real_runtime_read_missing_file_fails() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        assert!(runtime.read_to_string(&dir.path().join("gone")).is_err());
    }
}
