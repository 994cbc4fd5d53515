use std::fs;
use std::process::Command;

use httpmock::prelude::*;
use tempfile::TempDir;

fn manifest(base_dir: &std::path::Path, server: &MockServer) -> String {
    format!(
        r#"
base_dir = "{base}"
notes = ["Make a logo yourself"]

[[group]]
title = "thumbnails"
directory = "projects"

[[group.image]]
url = "{ok}"
filename = "one.jpg"

[[group.image]]
url = "{missing}"
filename = "two.jpg"

[[group]]
title = "others"

[[group.image]]
url = "{derived}"
"#,
        base = base_dir.display().to_string().replace('\\', "/"),
        ok = server.url("/seed/one/10/10"),
        missing = server.url("/seed/two/10/10"),
        derived = server.url("/x/y/z.png"),
    )
}

#[test]
fn batch_run_reports_failures_and_exits_zero() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/seed/one/10/10");
        then.status(200).body("one");
    });
    server.mock(|when, then| {
        when.method(GET).path("/seed/two/10/10");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(GET).path("/x/y/z.png");
        then.status(200).body("zzz");
    });

    let dir = TempDir::new().unwrap();
    let base = dir.path().join("images");
    let manifest_path = dir.path().join("manifest.toml");
    fs::write(&manifest_path, manifest(&base, &server)).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_placeholder-fetcher"))
        .arg("--manifest")
        .arg(&manifest_path)
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Starting download of 3 images..."));
    assert!(stdout.contains("Downloading thumbnails..."));
    assert!(stdout.contains("Downloading others..."));
    assert!(stdout.contains(&format!(
        "Error downloading {}: HTTP status 404",
        server.url("/seed/two/10/10")
    )));
    assert!(stdout.contains("Make a logo yourself"));
    assert!(stdout.contains("1 failed"));

    assert_eq!(fs::read(base.join("projects").join("one.jpg")).unwrap(), b"one");
    assert!(!base.join("projects").join("two.jpg").exists());
    assert_eq!(fs::read(base.join("z.png")).unwrap(), b"zzz");
}

#[test]
fn dump_manifest_prints_portfolio_defaults() {
    let output = Command::new(env!("CARGO_BIN_EXE_placeholder-fetcher"))
        .args(["--dump-manifest", "--base-dir", "site/images", "--jobs", "2"])
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("base_dir = \"site/images\""));
    assert!(stdout.contains("jobs = 2"));
    assert!(stdout.contains("https://picsum.photos/seed/project1/600/400"));
    assert!(stdout.contains("wood-texture-light.png"));
}

#[test]
fn unreadable_manifest_is_a_startup_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_placeholder-fetcher"))
        .args(["--manifest", "/definitely/not/here.toml"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}
