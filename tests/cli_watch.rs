//! E2E tests for `cascade watch`
//!
//! Watch mode runs until killed, so these tests spawn the binary, give the
//! startup build a moment, then kill it and scrape the NDJSON output.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

fn setup_project(dir: &Path) {
    fs::create_dir_all(dir.join("src")).unwrap();
    fs::write(dir.join("src/a.scss"), "a { color: red; }").unwrap();
}

#[test]
fn watch_emits_startup_events_in_json_mode() {
    let temp = tempdir().unwrap();
    setup_project(temp.path());

    let mut child = Command::new(env!("CARGO_BIN_EXE_cascade"))
        .arg("watch")
        .arg("--json")
        .current_dir(temp.path())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // enough time for staging reset + initial build + first aggregate
    thread::sleep(Duration::from_secs(2));
    child.kill().unwrap();
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("\"event\":\"watch_started\""),
        "stdout: {stdout}"
    );
    assert!(stdout.contains("\"event\":\"build_complete\""));
    assert!(stdout.contains("\"event\":\"aggregate_written\""));

    // the startup build already produced the aggregate
    let css = fs::read_to_string(temp.path().join("dist/styles.css")).unwrap();
    assert!(css.contains("color: red"));
}

#[test]
fn watch_exits_nonzero_when_source_root_missing() {
    let temp = tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_cascade"))
        .arg("watch")
        .current_dir(temp.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("source directory not found"));
}
