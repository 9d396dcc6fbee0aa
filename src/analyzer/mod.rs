//! External static-analyzer invocation.

use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Handle to the downstream static analyzer executable.
///
/// The analyzer receives the resolution map via `--packages <FILE>` and
/// inherits this process's stdio, so its diagnostics reach the user
/// directly.
#[derive(Debug)]
pub struct Analyzer {
    program: PathBuf,
    extra_args: Vec<String>,
}

impl Analyzer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    /// Extra arguments passed through before the analysis targets.
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    /// Run the analyzer against `targets` with the given resolution map.
    #[tracing::instrument(skip(self))]
    pub fn run(&self, map_file: &Path, targets: &[PathBuf]) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--packages").arg(map_file);
        cmd.args(&self.extra_args);
        cmd.args(targets);

        debug!("running analyzer: {:?}", cmd);
        let status = cmd
            .status()
            .with_context(|| format!("Failed to launch analyzer {:?}", self.program))?;
        if !status.success() {
            bail!("Analyzer {:?} exited with {}", self.program, status);
        }
        info!("analyzer finished");
        Ok(())
    }
}
