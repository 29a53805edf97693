//! CLI tests: exit codes, the check/lint alias, stdin input, and JSON
//! output contracts.

use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use assert_cmd::cargo;

const GOOD_CONFIG: &str = "set $mod Mod4\nfont pango:monospace 8\nbindsym $mod+Return exec term\nworkspace 1 output eDP-1\n";
const BAD_CONFIG: &str = "font pango:monospace 8\nthis is not a directive\n";

fn lattice_cfg() -> Command {
    Command::new(cargo::cargo_bin!("lattice-cfg"))
}

fn write_temp_config(content: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config");
    fs::write(&path, content).expect("write temp config");
    (dir, path.to_string_lossy().to_string())
}

fn run_with_stdin(args: &[&str], stdin_body: &str) -> std::process::Output {
    let mut child = lattice_cfg()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn lattice-cfg");

    {
        let stdin = child.stdin.as_mut().expect("stdin handle");
        stdin
            .write_all(stdin_body.as_bytes())
            .expect("write stdin body");
    }

    child.wait_with_output().expect("wait for output")
}

#[test]
fn check_passes_a_valid_config() {
    let (_dir, path) = write_temp_config(GOOD_CONFIG);
    let output = lattice_cfg()
        .args(["check", &path, "--output", "json"])
        .output()
        .expect("run check");
    assert!(
        output.status.success(),
        "check should pass, stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn check_fails_on_syntax_errors() {
    let (_dir, path) = write_temp_config(BAD_CONFIG);
    let output = lattice_cfg()
        .args(["check", &path, "--output", "json"])
        .output()
        .expect("run check");
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("\"success\": false"),
        "envelope should report failure: {stdout}"
    );
    assert!(
        stdout.contains("Expected one of these tokens"),
        "reply should carry the parser message: {stdout}"
    );
}

#[test]
fn lint_alias_is_available() {
    let output = lattice_cfg()
        .args(["lint", "--help"])
        .output()
        .expect("run lint help");
    assert!(
        output.status.success(),
        "expected lint alias, stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn check_supports_stdin_dash_path() {
    let output = run_with_stdin(&["check", "-", "--output", "json"], GOOD_CONFIG);
    assert!(
        output.status.success(),
        "check stdin should pass, stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn parse_emits_the_config_as_json() {
    let output = run_with_stdin(&["parse", "-", "--output", "json"], GOOD_CONFIG);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid parse json");
    assert_eq!(json["config"]["font"], "pango:monospace 8");
    assert_eq!(json["config"]["workspaces"][0]["number"], 1);
    assert_eq!(
        json["config"]["bindings"][0]["modifiers"][0],
        "Mod4",
        "variables should be expanded before parsing: {stdout}"
    );
}

#[test]
fn expand_resolves_variables_on_stdout() {
    let output = run_with_stdin(&["expand", "-", "--output", "json"], GOOD_CONFIG);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("bindsym Mod4+Return exec term"),
        "expanded output should substitute $mod: {stdout}"
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let output = lattice_cfg()
        .args(["check", "/nonexistent/lattice/config", "--output", "json"])
        .output()
        .expect("run check");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"), "{stderr}");
}
