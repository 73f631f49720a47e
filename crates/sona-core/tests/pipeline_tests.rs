// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests of the public pipeline: scenario checks, running
//! generated code under `python3` where available, independent instances
//! on separate threads and robustness against arbitrary input. Every
//! successful transpilation of generated input must also byte-compile.

use proptest::prelude::*;
use sona_core::codegen::python::CodegenOptions;
use sona_core::semantic_analysis::ScopeError;
use sona_core::source_analysis::{tokenize, LexErrorKind, Position};
use sona_core::transpiler::{TranspileError, Transpiler};
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

fn bare() -> Transpiler {
    Transpiler::new(CodegenOptions::new().with_header(false))
}

fn python(source: &str) -> String {
    bare()
        .transpile(source, "test.sona")
        .unwrap_or_else(|e| panic!("transpile failed: {e}"))
        .code
}

/// Runs `code` with `python3`, returning stdout, or `None` if no
/// interpreter is available.
fn run_python(code: &str) -> Option<String> {
    let mut child = Command::new("python3")
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .ok()?;
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(code.as_bytes())
        .expect("write to python3");
    let output = child.wait_with_output().expect("python3 runs");
    assert!(
        output.status.success(),
        "python3 rejected:\n{code}\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Byte-compiles `code` with `python3`, returning the compiler's complaint
/// if it rejects the code, or `None` if no interpreter is available.
fn python_compile_error(code: &str) -> Option<Option<String>> {
    let mut child = Command::new("python3")
        .args(["-c", "import sys; compile(sys.stdin.read(), 'generated.py', 'exec')"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .ok()?;
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(code.as_bytes())
        .expect("write to python3");
    let output = child.wait_with_output().expect("python3 runs");
    Some((!output.status.success()).then(|| String::from_utf8_lossy(&output.stderr).into_owned()))
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn declaration_scenario() {
    let output = bare().transpile("let x = 42", "test.sona").unwrap();
    assert_eq!(output.code, "x = 42\n");
    assert!(output.warnings.is_empty());
}

#[test]
fn function_scenario_runs_under_python() {
    let code = python("func add(a, b) { return a + b }\nprint(add(2, 3))");
    assert_eq!(code, "def add(a, b):\n    return a + b\n\nprint(add(2, 3))\n");
    match run_python(&code) {
        Some(stdout) => assert_eq!(stdout, "5\n"),
        None => eprintln!("python3 not found; skipping execution"),
    }
}

#[test]
fn conditional_scenario() {
    let code = python("let x = -1\nif x > 0 { print(\"pos\") } else { print(\"neg\") }");
    assert_eq!(
        code,
        "x = -1\nif x > 0:\n    print(\"pos\")\nelse:\n    print(\"neg\")\n"
    );
    if let Some(stdout) = run_python(&code) {
        assert_eq!(stdout, "neg\n");
    }
}

#[test]
fn unterminated_string_scenario() {
    let error = tokenize("\"abc").unwrap_err();
    assert_eq!(error.kind, LexErrorKind::UnterminatedString);
    assert_eq!(error.position, Position::new(1, 1));

    let error = bare().transpile("\"abc", "test.sona").unwrap_err();
    assert!(matches!(error, TranspileError::Lex(_)));
}

#[test]
fn duplicate_binding_scenario() {
    let error = bare()
        .transpile("let x = 1\nlet x = 2", "test.sona")
        .unwrap_err();
    let TranspileError::Semantic(semantic) = &error else {
        panic!("expected a semantic error, got {error:?}");
    };
    assert_eq!(semantic.kind, ScopeError::DuplicateBinding { name: "x".into() });
    assert!(error.message().contains('x'));
}

#[test]
fn closures_and_classes_run_under_python() {
    let source = r#"
class Stack {
    func init() {
        self.items = []
    }
    func push(item) {
        self.items.append(item)
        return self
    }
    func size() {
        return len(self.items)
    }
}

func counter() {
    let n = 0
    func next() {
        n = n + 1
        return n
    }
    return next
}

let total = 0
func add(k) {
    total = total + k
}

let s = Stack()
s.push(1).push(2)
let tick = counter()
tick()
add(10)
add(5)
print(s.size(), tick(), total, 7 % 3, "a" + 'b')
"#;
    let code = python(source);
    if let Some(stdout) = run_python(&code) {
        assert_eq!(stdout, "2 2 15 1 ab\n");
    }
}

#[test]
fn shadowed_names_keep_their_values_under_python() {
    let source = r"
let total = 10
for i in range(3) {
    let total = i
}
let i = 5
for i in range(2) { }
let x = 1
func f() {
    x = 2
    if true { let x = 3 }
}
f()
let n = 1
func g() {
    let before = n
    let n = 7
    return before + n
}
print(total, i, x, g())
";
    let code = python(source);
    if let Some(stdout) = run_python(&code) {
        assert_eq!(stdout, "10 5 2 8\n", "generated:\n{code}");
    }
}

#[test]
fn imports_sharing_a_package_run_under_python() {
    let code = python("import os\nimport os.path\nprint(os.path.basename(\"dir/file.txt\"))");
    assert_eq!(
        code,
        "import os\nimport os.path\nprint(os.path.basename(\"dir/file.txt\"))\n"
    );
    if let Some(stdout) = run_python(&code) {
        assert_eq!(stdout, "file.txt\n");
    }
}

#[test]
fn class_fields_are_reached_through_self() {
    let error = bare()
        .transpile(
            "class C {\n    let count = 0\n    func inc() { count = count + 1 }\n}",
            "test.sona",
        )
        .unwrap_err();
    let TranspileError::Semantic(semantic) = &error else {
        panic!("expected a semantic error, got {error:?}");
    };
    assert_eq!(
        semantic.kind,
        ScopeError::UndefinedName {
            name: "count".into()
        }
    );

    let source = r"
class C {
    let count = 0
    func inc() {
        self.count = self.count + 1
        return self.count
    }
}
let c = C()
c.inc()
print(c.inc())
";
    let code = python(source);
    if let Some(stdout) = run_python(&code) {
        assert_eq!(stdout, "2\n");
    }
}

#[test]
fn every_error_kind_is_reported() {
    let mut transpiler = bare();
    let kinds: Vec<_> = ["'open", "let = 1", "const k = 1\nk = 2", "break"]
        .iter()
        .map(|source| transpiler.report(source, "test.sona"))
        .map(|report| report.error.map(|error| error.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            Some("LEXER_ERROR"),
            Some("PARSER_ERROR"),
            Some("SEMANTIC_ERROR"),
            Some("CODEGEN_ERROR"),
        ]
    );
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn independent_transpilers_run_on_separate_threads() {
    let sources: Vec<String> = (0..8)
        .map(|i| format!("let x{i} = {i}\nfunc f{i}(a) {{ return a * x{i} }}\nprint(f{i}(2))"))
        .collect();
    let expected: Vec<String> = sources.iter().map(|source| python(source)).collect();

    let handles: Vec<_> = sources
        .into_iter()
        .map(|source| {
            thread::spawn(move || {
                let mut transpiler = bare();
                (0..20)
                    .map(|_| transpiler.transpile(&source, "test.sona").map(|o| o.code))
                    .collect::<Result<Vec<_>, _>>()
            })
        })
        .collect();

    for (handle, expected) in handles.into_iter().zip(expected) {
        let outputs = handle.join().expect("thread panicked").expect("transpiles");
        assert!(outputs.iter().all(|code| *code == expected));
    }
}

// ============================================================================
// Robustness
// ============================================================================

/// Sona-looking fragments, so generated inputs reach past the lexer.
fn fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "let", "const", "func", "class", "if", "else", "while", "for", "in", "return",
        "break", "continue", "import", "from", "as", "try", "catch", "print", "and", "or",
        "not", "true", "false", "null", "x", "y", "self", "init", "0", "1.5", "'s'", "(",
        ")", "{", "}", "[", "]", ",", ".", ":", ";", "\n", "=", "==", "!=", "<", "<=", "+",
        "-", "*", "/", "%", "!", "&&", "||", "->",
    ])
}

proptest! {
    #[test]
    fn transpile_never_panics_on_arbitrary_text(source in "\\PC{0,200}") {
        let _ = bare().transpile(&source, "fuzz.sona");
    }

    #[test]
    fn transpile_never_panics_on_token_soup(
        fragments in prop::collection::vec(fragment(), 0..60)
    ) {
        let source = fragments.join(" ");
        match bare().transpile(&source, "fuzz.sona") {
            Ok(output) => {
                prop_assert!(output.code.is_empty() || output.code.ends_with('\n'));
                if let Some(complaint) = python_compile_error(&output.code) {
                    prop_assert!(
                        complaint.is_none(),
                        "python3 rejected output of {:?}:\n{}\n{:?}",
                        source,
                        output.code,
                        complaint
                    );
                }
            }
            Err(error) => prop_assert!(error.line_column().is_some()),
        }
    }
}
