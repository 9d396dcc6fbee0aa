//! Emission of the resolution map handed to the downstream analyzer.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::runtime::{Runtime, path::relative_path_from_dir};

use super::Resolution;

#[derive(Serialize)]
struct MapFile<'a> {
    packages: &'a BTreeMap<String, String>,
}

/// Render the resolution as pretty-printed JSON.
///
/// Keys are emitted in name order, so the output is byte-stable for a
/// given resolution. When `relative_to` is given, paths are rewritten
/// relative to that directory where a relative form exists and kept
/// absolute otherwise.
pub fn render_map(resolution: &Resolution, relative_to: Option<&Path>) -> Result<String> {
    let packages: BTreeMap<String, String> = resolution
        .packages
        .iter()
        .map(|(name, path)| {
            let rendered = match relative_to.and_then(|base| relative_path_from_dir(base, path)) {
                Some(relative) => relative.display().to_string(),
                None => path.display().to_string(),
            };
            (name.clone(), rendered)
        })
        .collect();

    let mut text = serde_json::to_string_pretty(&MapFile {
        packages: &packages,
    })
    .context("Failed to serialize resolution map")?;
    text.push('\n');
    Ok(text)
}

/// Write the resolution map to `path`, creating parent directories as
/// needed. In relative mode, entries are made relative to the map file's
/// own directory.
pub fn write_map_file<R: Runtime>(
    runtime: &R,
    path: &Path,
    resolution: &Resolution,
    relative: bool,
) -> Result<()> {
    let base = if relative { path.parent() } else { None };
    let text = render_map(resolution, base)?;

    if let Some(parent) = path.parent()
        && !runtime.exists(parent)
    {
        runtime.create_dir_all(parent)?;
    }

    runtime
        .write(path, text.as_bytes())
        .with_context(|| format!("Failed to write resolution map to {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    fn sample_resolution() -> Resolution {
        let mut packages = BTreeMap::new();
        packages.insert(
            "http_client".to_string(),
            PathBuf::from("/work/tree/pkgs/http/lib"),
        );
        packages.insert(
            "term_ui".to_string(),
            PathBuf::from("/work/tree/pkgs/term_ui/lib"),
        );
        Resolution { packages }
    }

    #[test]
    fn test_render_map_absolute() {
        let text = render_map(&sample_resolution(), None).unwrap();
        let expected = r#"{
  "packages": {
    "http_client": "/work/tree/pkgs/http/lib",
    "term_ui": "/work/tree/pkgs/term_ui/lib"
  }
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_map_relative() {
        let text = render_map(&sample_resolution(), Some(Path::new("/work/tree/out"))).unwrap();
        assert!(text.contains("\"http_client\": \"../pkgs/http/lib\""));
        assert!(text.contains("\"term_ui\": \"../pkgs/term_ui/lib\""));
    }

    #[test]
    fn test_render_map_is_deterministic() {
        let a = render_map(&sample_resolution(), None).unwrap();
        let b = render_map(&sample_resolution(), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_write_map_file_creates_parent() {
        let mut runtime = MockRuntime::new();
        let out = PathBuf::from("/work/tree/out/packages.json");

        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/work/tree/out")))
            .returning(|_| false);
        runtime
            .expect_create_dir_all()
            .with(eq(PathBuf::from("/work/tree/out")))
            .returning(|_| Ok(()));
        runtime
            .expect_write()
            .withf(|path, contents| {
                path == Path::new("/work/tree/out/packages.json")
                    && std::str::from_utf8(contents)
                        .unwrap()
                        .contains("/work/tree/pkgs/http/lib")
            })
            .returning(|_, _| Ok(()));

        write_map_file(&runtime, &out, &sample_resolution(), false).unwrap();
    }
}
