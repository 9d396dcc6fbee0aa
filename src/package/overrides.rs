//! Dependency-override file (`.pkgpaths`) parsing.
//!
//! One assertion per line in the form `name:path`. Blank lines and lines
//! starting with `#` are skipped. Paths may be relative; resolution
//! against the override file's directory happens in the scanner.

use anyhow::{Result, bail};
use std::path::Path;

/// File name of a dependency-override file.
pub const OVERRIDES_FILE: &str = ".pkgpaths";

/// One `name:path` assertion, path kept as written.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideEntry {
    pub name: String,
    pub raw_path: String,
}

/// Parse the contents of an override file. `source` is used only for
/// error messages.
pub fn parse_overrides(content: &str, source: &Path) -> Result<Vec<OverrideEntry>> {
    let mut entries = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((name, path)) = trimmed.split_once(':') else {
            bail!(
                "{}:{}: expected 'name:path', got '{}'",
                source.display(),
                idx + 1,
                trimmed
            );
        };
        let (name, path) = (name.trim(), path.trim());
        if name.is_empty() || path.is_empty() {
            bail!(
                "{}:{}: empty package name or path in '{}'",
                source.display(),
                idx + 1,
                trimmed
            );
        }
        entries.push(OverrideEntry {
            name: name.to_string(),
            raw_path: path.to_string(),
        });
    }
    Ok(entries)
}
