//! Analyze action - resolves the tree, then hands the map to the analyzer.

use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

use crate::analyzer::Analyzer;
use crate::resolve::write_map_file;
use crate::runtime::Runtime;

use super::{PassConfig, build_registry};

/// Analyze action - the full pipeline: scan, reconcile, emit, invoke.
pub struct AnalyzeAction<'a, R: Runtime> {
    runtime: &'a R,
    config: PassConfig,
    analyzer: Analyzer,
    map_path: PathBuf,
}

impl<'a, R: Runtime> AnalyzeAction<'a, R> {
    pub fn new(
        runtime: &'a R,
        config: PassConfig,
        analyzer: Analyzer,
        map_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runtime,
            config,
            analyzer,
            map_path: map_path.into(),
        }
    }

    /// Resolve the tree, write the map file, and run the analyzer against
    /// `targets`. Conflicts abort before the analyzer is launched.
    #[tracing::instrument(skip(self))]
    pub fn analyze(&self, targets: &[PathBuf]) -> Result<()> {
        let registry = build_registry(self.runtime, &self.config)?;
        let resolution = registry.finish()?;
        info!(
            "resolved {} packages, map at {}",
            resolution.len(),
            self.map_path.display()
        );
        write_map_file(self.runtime, &self.map_path, &resolution, false)?;
        self.analyzer.run(&self.map_path, targets)
    }

    pub fn map_path(&self) -> &Path {
        &self.map_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Conflicts;
    use crate::runtime::MockRuntime;
    use crate::test_utils::{configure_mock_canonicalize, test_tree};
    use mockall::predicate::eq;

    #[test]
    fn test_analyze_aborts_on_conflict_before_writing_map() {
        let mut runtime = MockRuntime::new();
        configure_mock_canonicalize(&mut runtime);
        let root = test_tree();
        runtime.expect_is_dir().returning(|_| true);
        runtime
            .expect_exists()
            .with(eq(root.join("pkg.json")))
            .returning(|_| false);
        runtime
            .expect_exists()
            .with(eq(root.join(".pkgpaths")))
            .returning(|_| true);
        runtime
            .expect_read_to_string()
            .with(eq(root.join(".pkgpaths")))
            .returning(|_| {
                Ok("http_client:/vendor/http/lib\nhttp_client:/vendor/http2/lib\n".to_string())
            });
        runtime
            .expect_read_dir()
            .with(eq(root.clone()))
            .returning(|_| Ok(vec![]));
        // No expect_write: writing the map on a conflicting tree would
        // fail the mock

        let action = AnalyzeAction::new(
            &runtime,
            PassConfig {
                root,
                ..PassConfig::default()
            },
            Analyzer::new("/usr/bin/analyzer"),
            "/work/out/packages.json",
        );
        let err = action.analyze(&[]).unwrap_err();
        assert!(err.downcast_ref::<Conflicts>().is_some());
    }

    #[test]
    #[cfg(unix)]
    fn test_analyze_clean_tree_runs_analyzer() {
        let mut runtime = MockRuntime::new();
        configure_mock_canonicalize(&mut runtime);
        let root = test_tree();
        runtime.expect_is_dir().returning(|_| true);
        runtime
            .expect_exists()
            .with(eq(root.join("pkg.json")))
            .returning(|_| true);
        runtime
            .expect_read_to_string()
            .with(eq(root.join("pkg.json")))
            .returning(|_| Ok(r#"{ "name": "http_client" }"#.to_string()));
        runtime
            .expect_exists()
            .with(eq(root.join(".pkgpaths")))
            .returning(|_| false);
        runtime
            .expect_read_dir()
            .with(eq(root.clone()))
            .returning(|_| Ok(vec![]));
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/work/out")))
            .returning(|_| true);
        runtime.expect_write().returning(|_, _| Ok(()));

        let action = AnalyzeAction::new(
            &runtime,
            PassConfig {
                root,
                ..PassConfig::default()
            },
            Analyzer::new("true"),
            "/work/out/packages.json",
        );
        action.analyze(&[]).unwrap();
    }
}
