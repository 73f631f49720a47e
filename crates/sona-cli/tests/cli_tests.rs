// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the `sona` binary.
//!
//! Each test lays out a throwaway project in a temporary directory and runs
//! the compiled binary against it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn sona(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sona"))
        .args(args)
        .current_dir(cwd)
        .env_remove("SONA_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run sona binary")
}

fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn build_writes_python_and_source_map() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/app.sona", "let x = 42\nprint(x)\n");
    write(root, "src/util/text.sona", "func shout(s) { return s + \"!\" }\n");

    let output = sona(&["build", "."], root);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let app = fs::read_to_string(root.join("build/app.py")).unwrap();
    assert_eq!(
        app,
        "# Auto-generated from Sona source code\nfrom sona.runtime import *\n\nx = 42\nprint(x)\n"
    );
    assert!(root.join("build/util/text.py").is_file());

    let map: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("build/app.py.map")).unwrap()).unwrap();
    assert_eq!(map["mappings"].as_array().unwrap().len(), 2);
    assert_eq!(map["mappings"][0]["generated"]["line"], 4);
    assert_eq!(map["mappings"][0]["source"]["line"], 1);
}

#[test]
fn manifest_configures_generation() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "sona.toml",
        "[transpile]\nruntime_module = \"\"\nsource_maps = false\n",
    );
    write(root, "main.sona", "let x = 1\n");

    let output = sona(&["build", "main.sona"], root);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let code = fs::read_to_string(root.join("build/main.py")).unwrap();
    assert_eq!(code, "# Auto-generated from Sona source code\n\nx = 1\n");
    assert!(!root.join("build/main.py.map").exists());
}

#[test]
fn flags_override_manifest() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "sona.toml", "[transpile]\nheader = true\n");
    write(root, "main.sona", "let x = 1\n");

    let output = sona(
        &["build", ".", "--no-header", "--no-source-map", "-o", "out"],
        root,
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fs::read_to_string(root.join("out/main.py")).unwrap(), "x = 1\n");
    assert!(!root.join("out/main.py.map").exists());
}

#[test]
fn errors_are_rendered_with_source_context() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "bad.sona", "let x = 1\nlet x = 2\n");

    let output = sona(&["check", "bad.sona"], root);
    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("`x` is already defined in this scope"), "{stderr}");
    assert!(stderr.contains("bad.sona"), "{stderr}");
    assert!(stderr.contains("Check failed: 1 of 1 file(s) had errors"), "{stderr}");
    assert!(!root.join("build").exists());
}

#[test]
fn failed_files_are_not_written() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "good.sona", "print(1)\n");
    write(root, "bad.sona", "break\n");

    let output = sona(&["build", "."], root);
    assert!(!output.status.success());
    assert!(root.join("build/good.py").is_file());
    assert!(!root.join("build/bad.py").exists());
}

#[test]
fn check_json_reports_each_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "a.sona", "let a = 1\n");
    write(root, "b.sona", "let = 1\n");

    let output = sona(&["check", ".", "--json"], root);
    assert!(!output.status.success());
    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["success"], true);
    assert_eq!(reports[0]["code"], "# Auto-generated from Sona source code\nfrom sona.runtime import *\n\na = 1\n");
    assert_eq!(reports[1]["success"], false);
    assert_eq!(reports[1]["error"]["kind"], "PARSER_ERROR");
    assert_eq!(reports[1]["error"]["line"], 1);
    assert_eq!(reports[1]["error"]["column"], 5);
}

#[test]
fn warnings_do_not_fail_the_build() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "main.sona", "print(helper(1))\n");

    let output = sona(&["check", "main.sona"], root);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("`helper` is never defined in this program"));
}

#[test]
fn missing_sources_are_an_error() {
    let temp = TempDir::new().unwrap();
    let output = sona(&["build", "."], temp.path());
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No .sona source files found"));

    write(temp.path(), "notes.txt", "");
    let output = sona(&["check", "notes.txt"], temp.path());
    assert!(!output.status.success());
    assert!(stderr(&output).contains("is not a .sona source file"));
}
