use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn pkgmap() -> Command {
    Command::cargo_bin("pkgmap").unwrap()
}

/// A tree where one package is defined by a manifest and referenced by an
/// agreeing override.
fn clean_tree() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    write_file(
        &dir.path().join("pkgs/http/pkg.json"),
        r#"{ "name": "http_client" }"#,
    );
    write_file(
        &dir.path().join("app/.pkgpaths"),
        "# pinned to the in-tree copy\nhttp_client:../pkgs/http/lib\n",
    );
    dir
}

#[test]
fn test_check_clean_tree() {
    let dir = clean_tree();

    pkgmap()
        .args(["check", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ok: 1 package(s) resolve to a single location",
        ));
}

#[test]
fn test_resolve_prints_map() {
    let dir = clean_tree();

    pkgmap()
        .args(["resolve", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"http_client\""))
        .stdout(predicate::str::contains("pkgs/http/lib"));
}

#[test]
fn test_resolve_writes_relative_map_file() {
    let dir = clean_tree();
    // Canonicalize so the emitted relative paths share the map file's prefix
    let root = dir.path().canonicalize().unwrap();
    let output = root.join("out/packages.json");

    pkgmap()
        .args([
            "resolve",
            root.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--relative",
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("\"http_client\": \"../pkgs/http/lib\""));
}

#[test]
fn test_check_conflicting_tree_exits_2_with_report() {
    let dir = tempdir().unwrap();
    write_file(
        &dir.path().join("pkgs/http/pkg.json"),
        r#"{ "name": "http_client" }"#,
    );
    write_file(
        &dir.path().join("app/.pkgpaths"),
        "http_client:../vendor/http/lib\n",
    );

    pkgmap()
        .args(["check", dir.path().to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("package http_client:"))
        .stderr(predicate::str::contains("authoritative definition"))
        .stderr(predicate::str::contains("implicate the managed tree"));
}

#[test]
fn test_conflict_outside_home_root_gets_manual_advice() {
    let dir = tempdir().unwrap();
    let elsewhere = tempdir().unwrap();
    write_file(
        &dir.path().join("a/.pkgpaths"),
        "http_client:/opt/one/lib\n",
    );
    write_file(
        &dir.path().join("b/.pkgpaths"),
        "http_client:/opt/two/lib\n",
    );

    pkgmap()
        .args([
            "check",
            dir.path().to_str().unwrap(),
            "--home-root",
            elsewhere.path().to_str().unwrap(),
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "correct the named override files by hand",
        ));
}

#[test]
fn test_resolve_conflicting_tree_fails() {
    let dir = tempdir().unwrap();
    write_file(
        &dir.path().join("a/.pkgpaths"),
        "http_client:/opt/one/lib\n",
    );
    write_file(
        &dir.path().join("b/.pkgpaths"),
        "http_client:/opt/two/lib\n",
    );

    pkgmap()
        .args(["resolve", dir.path().to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("/opt/one/lib (1 claim)"))
        .stderr(predicate::str::contains("/opt/two/lib (1 claim)"));
}

#[test]
fn test_self_package_override_is_exempted() {
    let dir = tempdir().unwrap();
    write_file(
        &dir.path().join("pkgs/me/pkg.json"),
        r#"{ "name": "me" }"#,
    );
    // A transitively pulled-in redefinition of the tool's own package
    write_file(&dir.path().join("app/.pkgpaths"), "me:vendor/me/lib\n");

    pkgmap()
        .args([
            "check",
            dir.path().to_str().unwrap(),
            "--self-package",
            "me",
        ])
        .assert()
        .success();

    // Without the exemption the same tree conflicts
    pkgmap()
        .args(["check", dir.path().to_str().unwrap()])
        .assert()
        .code(2);
}

#[test]
fn test_excluded_directory_is_skipped() {
    let dir = clean_tree();
    // A stale copy that would conflict if scanned
    write_file(
        &dir.path().join("build/.pkgpaths"),
        "http_client:/stale/http/lib\n",
    );

    pkgmap()
        .args([
            "check",
            dir.path().to_str().unwrap(),
            "--exclude",
            "build",
        ])
        .assert()
        .success();
}

#[test]
fn test_malformed_override_is_a_plumbing_error() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join(".pkgpaths"), "broken-line\n");

    pkgmap()
        .args(["check", dir.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected 'name:path'"));
}

#[test]
fn test_missing_root_fails() {
    pkgmap()
        .args(["check", "/definitely/not/a/real/tree"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to locate scan root"));
}

#[test]
#[cfg(unix)]
fn test_analyze_runs_analyzer_with_map() {
    let dir = clean_tree();
    let map = dir.path().join("out/packages.json");

    pkgmap()
        .args([
            "analyze",
            dir.path().to_str().unwrap(),
            "--analyzer",
            "true",
            "--map",
            map.to_str().unwrap(),
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&map).unwrap();
    assert!(content.contains("\"http_client\""));
}

#[test]
#[cfg(unix)]
fn test_analyze_propagates_analyzer_failure() {
    let dir = clean_tree();
    let map = dir.path().join("out/packages.json");

    pkgmap()
        .args([
            "analyze",
            dir.path().to_str().unwrap(),
            "--analyzer",
            "false",
            "--map",
            map.to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exited with"));
}
