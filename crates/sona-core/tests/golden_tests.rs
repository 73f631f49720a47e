// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Golden-file tests for the transpiler.
//!
//! Test cases are discovered from the `cases/` directory. Each subdirectory
//! holds a `main.sona` input and the `expected.py` it must transpile to with
//! default options.
//!
//! The generated Python is additionally checked with `python3`'s `ast`
//! module (skipped if no interpreter is available).

use camino::{Utf8Path, Utf8PathBuf};
use sona_core::codegen::python::CodegenOptions;
use sona_core::transpiler::Transpiler;
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

fn cases_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("cases")
}

/// Every case directory, sorted by name.
fn case_names() -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(cases_dir())
        .expect("cases directory should exist")
        .filter_map(Result::ok)
        .filter(|entry| entry.path().join("main.sona").is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}

fn read(path: &Utf8Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path}: {e}"))
}

fn python3_available() -> bool {
    Command::new("python3")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Parses `code` with `ast.parse`, returning the interpreter's stderr on
/// failure.
fn python_parses(code: &str) -> Result<(), String> {
    let mut child = Command::new("python3")
        .args(["-c", "import ast, sys; ast.parse(sys.stdin.read())"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| e.to_string())?;
    child
        .stdin
        .take()
        .ok_or("no stdin")?
        .write_all(code.as_bytes())
        .map_err(|e| e.to_string())?;
    let output = child.wait_with_output().map_err(|e| e.to_string())?;
    if output.status.success() {
        Ok(())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).into_owned())
    }
}

#[test]
fn cases_are_present() {
    assert!(case_names().len() >= 4, "found {:?}", case_names());
}

#[test]
fn cases_match_expected_python() {
    let mut transpiler = Transpiler::new(CodegenOptions::new());
    let mut failures = Vec::new();
    for case in case_names() {
        let dir = cases_dir().join(&case);
        let source = read(&dir.join("main.sona"));
        let expected = read(&dir.join("expected.py"));
        match transpiler.transpile(&source, "main.sona") {
            Ok(output) if output.code == expected => {}
            Ok(output) => failures.push(format!(
                "{case}: output differs\n--- expected\n{expected}\n--- actual\n{}",
                output.code
            )),
            Err(error) => failures.push(format!("{case}: {} {}", error.kind(), error)),
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n\n"));
}

#[test]
fn cases_have_no_warnings() {
    let mut transpiler = Transpiler::new(CodegenOptions::new());
    for case in case_names() {
        let source = read(&cases_dir().join(&case).join("main.sona"));
        let output = transpiler
            .transpile(&source, "main.sona")
            .unwrap_or_else(|e| panic!("{case}: {e}"));
        assert!(
            output.warnings.is_empty(),
            "{case}: unexpected warnings {:?}",
            output.warnings
        );
    }
}

#[test]
fn expected_python_is_valid_python() {
    if !python3_available() {
        eprintln!("python3 not found; skipping syntax check");
        return;
    }
    for case in case_names() {
        let expected = read(&cases_dir().join(&case).join("expected.py"));
        if let Err(stderr) = python_parses(&expected) {
            panic!("{case}: expected.py is not valid Python:\n{stderr}");
        }
    }
}
