// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::ast_builder::build_program;
use crate::semantic_analysis::ScopeError;
use crate::source_analysis::{parse, tokenize, Severity};
use crate::source_map::{GeneratedPosition, SourcePosition};

fn program(source: &str) -> Program {
    let tree = parse(tokenize(source).expect("source should tokenize")).expect("source should parse");
    build_program(tree).expect("tree should build")
}

fn generate_with(source: &str, options: CodegenOptions) -> Result<GeneratedPython> {
    PythonGenerator::new(options).generate(&program(source), "test.sona")
}

/// Generated code without the header.
fn python(source: &str) -> String {
    generate_with(source, CodegenOptions::new().with_header(false))
        .expect("generation should succeed")
        .code
}

fn generation_error(source: &str) -> CodeGenError {
    generate_with(source, CodegenOptions::new().with_header(false))
        .expect_err("generation should fail")
}

// ========================================================================
// Statements
// ========================================================================

#[test]
fn declaration_becomes_assignment() {
    assert_eq!(python("let x = 42"), "x = 42\n");
    assert_eq!(python("const limit: int = 10"), "limit = 10\n");
}

#[test]
fn function_definition_and_call() {
    let source = "func add(a, b) {\n    return a + b\n}\nprint(add(2, 3))\n";
    insta::assert_snapshot!(python(source), @r"
    def add(a, b):
        return a + b

    print(add(2, 3))
    ");
}

#[test]
fn if_else_branches() {
    let source = "let x = 1\nif x > 0 { print(\"pos\") } else { print(\"neg\") }";
    insta::assert_snapshot!(python(source), @r#"
    x = 1
    if x > 0:
        print("pos")
    else:
        print("neg")
    "#);
}

#[test]
fn else_if_chain_becomes_elif() {
    let source = r#"
let n = 5
if n < 0 {
    print("negative")
} else if n == 0 {
    print("zero")
} else {
    print("positive")
}
"#;
    insta::assert_snapshot!(python(source), @r#"
    n = 5
    if n < 0:
        print("negative")
    elif n == 0:
        print("zero")
    else:
        print("positive")
    "#);
}

#[test]
fn loops_with_break_and_continue() {
    let source = r"
let i = 0
while i < 10 {
    i = i + 1
    if i % 2 == 0 { continue }
    if i > 7 { break }
}
for item in [1, 2, 3] {
    print(item)
}
";
    insta::assert_snapshot!(python(source), @r"
    i = 0
    while i < 10:
        i = i + 1
        if i % 2 == 0:
            continue
        if i > 7:
            break
    for item in [1, 2, 3]:
        print(item)
    ");
}

#[test]
fn empty_bodies_emit_pass() {
    insta::assert_snapshot!(python("func noop() {}\nwhile false {}"), @r"
    def noop():
        pass

    while False:
        pass
    ");
}

#[test]
fn bare_block_shares_indentation() {
    assert_eq!(python("{\n    let y = 1\n    print(y)\n}"), "y = 1\nprint(y)\n");
}

#[test]
fn parameters_with_defaults() {
    let source = "func greet(name = \"World\", punctuation: str = \"!\") {\n    print(\"Hello, \" + name + punctuation)\n}";
    insta::assert_snapshot!(python(source), @r#"
    def greet(name="World", punctuation="!"):
        print("Hello, " + name + punctuation)
    "#);
}

#[test]
fn property_and_index_targets() {
    let source = "let data = {items: [0, 0]}\ndata.items[1] = 5\ndata[\"extra\"] = true";
    insta::assert_snapshot!(python(source), @r#"
    data = {"items": [0, 0]}
    data.items[1] = 5
    data["extra"] = True
    "#);
}

#[test]
fn class_with_constructor_and_methods() {
    let source = r"
class Counter {
    let count = 0
    func init(start) {
        self.count = start
    }
    func increment() {
        self.count = self.count + 1
        return self.count
    }
}
let c = Counter(5)
c.increment()
";
    insta::assert_snapshot!(python(source), @r"
    class Counter:
        count = 0
        def __init__(self, start):
            self.count = start

        def increment(self):
            self.count = self.count + 1
            return self.count


    c = Counter(5)
    c.increment()
    ");
}

#[test]
fn outer_reassignment_declares_global_and_nonlocal() {
    let source = r"
let count = 0
func bump() {
    count = count + 1
}
func outer() {
    let total = 0
    func add(n) {
        total = total + n
    }
    add(1)
    return total
}
";
    insta::assert_snapshot!(python(source), @r"
    count = 0
    def bump():
        global count
        count = count + 1

    def outer():
        total = 0
        def add(n):
            nonlocal total
            total = total + n

        add(1)
        return total
    ");
}

#[test]
fn local_declaration_is_not_global() {
    let source = "let x = 1\nfunc f() {\n    let x = 2\n    x = 3\n}";
    insta::assert_snapshot!(python(source), @r"
    x = 1
    def f():
        x = 2
        x = 3
    ");
}

#[test]
fn block_declaration_shadowing_is_renamed() {
    let source = r"
let total = 10
for i in range(3) {
    let total = i
    print(total)
}
print(total)
";
    insta::assert_snapshot!(python(source), @r"
    total = 10
    for i in range(3):
        total_1 = i
        print(total_1)
    print(total)
    ");
}

#[test]
fn shadowing_loop_and_catch_variables_are_renamed() {
    let source = r"
let i = 5
let e = 0
for i in range(2) {
    print(i)
}
try {
    print(i)
} catch (e) {
    print(e)
}
print(i, e)
";
    insta::assert_snapshot!(python(source), @r"
    i = 5
    e = 0
    for i_1 in range(2):
        print(i_1)
    try:
        print(i)
    except Exception as e_1:
        print(e_1)
    print(i, e)
    ");
}

#[test]
fn sibling_blocks_keep_plain_names() {
    let source = "if true {\n    let t = 1\n    print(t)\n}\nif false {\n    let t = 2\n    print(t)\n}";
    insta::assert_snapshot!(python(source), @r"
    if True:
        t = 1
        print(t)
    if False:
        t = 2
        print(t)
    ");
}

#[test]
fn renamed_bindings_avoid_names_in_use() {
    let source = "let x = 1\nlet x_1 = 2\n{\n    let x = 3\n    print(x, x_1)\n}\nprint(x)";
    insta::assert_snapshot!(python(source), @r"
    x = 1
    x_1 = 2
    x_2 = 3
    print(x_2, x_1)
    print(x)
    ");
}

#[test]
fn block_local_does_not_hide_global_assignment() {
    let source = r"
let x = 1
func f() {
    x = 2
    if true {
        let x = 3
        print(x)
    }
}
";
    insta::assert_snapshot!(python(source), @r"
    x = 1
    def f():
        global x
        x = 2
        if True:
            x_1 = 3
            print(x_1)
    ");
}

#[test]
fn local_declared_after_outer_read_is_renamed() {
    let source = r"
let n = 1
func f() {
    let before = n
    let n = 2
    return before + n
}
";
    insta::assert_snapshot!(python(source), @r"
    n = 1
    def f():
        before = n
        n_1 = 2
        return before + n_1
    ");
}

#[test]
fn nested_function_reads_outer_name_past_block_local() {
    let source = r"
let x = 1
func f() {
    if true {
        let x = 2
    }
    func g() {
        return x
    }
    return g()
}
";
    insta::assert_snapshot!(python(source), @r"
    x = 1
    def f():
        if True:
            x_1 = 2
        def g():
            return x

        return g()
    ");
}

#[test]
fn methods_do_not_see_class_names() {
    let error = generation_error(
        "class C {\n    let count = 0\n    func inc() {\n        count = count + 1\n    }\n}",
    );
    let CodeGenError::Semantic(semantic) = &error else {
        panic!("expected a semantic error, got {error:?}");
    };
    assert_eq!(
        semantic.kind,
        ScopeError::UndefinedName {
            name: "count".into()
        }
    );
    assert_eq!(error.position(), Some(Position::new(4, 9)));

    let generated = generate_with(
        "class C {\n    let size = 1\n    func get() {\n        return size\n    }\n}",
        CodegenOptions::new().with_header(false),
    )
    .expect("generation should succeed");
    assert_eq!(generated.warnings.len(), 1);
    assert_eq!(
        generated.warnings[0].message,
        "`size` is never defined in this program"
    );
}

#[test]
fn try_catch_maps_to_except() {
    let source = "func risky() { return 1 }\ntry {\n    risky()\n} catch (e) {\n    print(e)\n}";
    insta::assert_snapshot!(python(source), @r"
    def risky():
        return 1

    try:
        risky()
    except Exception as e:
        print(e)
    ");
    assert_eq!(
        python("try { } catch { }"),
        "try:\n    pass\nexcept Exception:\n    pass\n"
    );
}

#[test]
fn imports_bind_names() {
    let source = "import math\nimport os.path as p\nfrom collections import deque, OrderedDict\nprint(math.pi, p, deque, OrderedDict)";
    let generated = generate_with(source, CodegenOptions::new().with_header(false))
        .expect("generation should succeed");
    insta::assert_snapshot!(generated.code, @r"
    import math
    import os.path as p
    from collections import deque, OrderedDict
    print(math.pi, p, deque, OrderedDict)
    ");
    assert!(generated.warnings.is_empty());
}

#[test]
fn imports_may_share_a_root_package() {
    let source = "import os\nimport os.path\nimport os.path as p\nprint(os.path.sep, p)";
    insta::assert_snapshot!(python(source), @r"
    import os
    import os.path
    import os.path as p
    print(os.path.sep, p)
    ");
    assert_eq!(
        python("import os.path\nimport os.sep"),
        "import os.path\nimport os.sep\n"
    );

    let error = generation_error("let os = 1\nimport os.path");
    let CodeGenError::Semantic(semantic) = &error else {
        panic!("expected a semantic error, got {error:?}");
    };
    assert_eq!(semantic.kind, ScopeError::DuplicateBinding { name: "os".into() });
}

#[test]
fn functions_are_hoisted() {
    let generated = generate_with(
        "print(later())\nfunc later() { return 1 }",
        CodegenOptions::new().with_header(false),
    )
    .expect("generation should succeed");
    assert!(generated.warnings.is_empty());
}

// ========================================================================
// Expressions
// ========================================================================

#[test]
fn parentheses_follow_python_precedence() {
    let source = r"
let a = 1
let b = 2
let c = 3
print((a + b) * c)
print(a - (b - c))
print(a - b - c)
print(!(a == b))
print(!a == b)
print(a < b == true)
print(a && b || c)
print(a and (b or c))
print(-(a + b))
print((-a).real)
print(1.real)
";
    insta::assert_snapshot!(python(source), @r"
    a = 1
    b = 2
    c = 3
    print((a + b) * c)
    print(a - (b - c))
    print(a - b - c)
    print(not a == b)
    print((not a) == b)
    print((a < b) == True)
    print(a and b or c)
    print(a and (b or c))
    print(-(a + b))
    print((-a).real)
    print((1).real)
    ");
}

#[test]
fn literals_use_python_spelling() {
    let source = "let n = 007\nlet f = 3.25\nlet s = 'it\\'s \"quoted\"\\n'\nlet z = null\nlet o = {name: \"x\", \"k\": [1, 2], 03: false}";
    insta::assert_snapshot!(python(source), @r#"
    n = 7
    f = 3.25
    s = "it's \"quoted\"\n"
    z = None
    o = {"name": "x", "k": [1, 2], 3: False}
    "#);
}

#[test]
fn reserved_words_are_mangled() {
    assert_eq!(
        python("let lambda = 1\nprint(lambda)\nlet pass = lambda.def"),
        "lambda_ = 1\nprint(lambda_)\npass_ = lambda_.def_\n"
    );
}

#[test]
fn long_collections_break_across_lines() {
    let options = CodegenOptions::new().with_header(false).with_line_width(30);
    let generated = generate_with(
        "let items = [100000, 200000, 300000, 400000]\nfunc f() { return g(items, items, items, items) }",
        options,
    )
    .expect("generation should succeed");
    insta::assert_snapshot!(generated.code, @r"
    items = [
        100000,
        200000,
        300000,
        400000,
    ]
    def f():
        return g(
            items,
            items,
            items,
            items,
        )
    ");
}

#[test]
fn short_collections_stay_flat() {
    assert_eq!(python("print([], {}, [1])"), "print([], {}, [1])\n");
}

// ========================================================================
// Errors
// ========================================================================

#[test]
fn break_outside_loop_has_no_mapping() {
    let error = generation_error("break");
    assert!(matches!(
        error,
        CodeGenError::NoMapping {
            construct: "break",
            ..
        }
    ));
    assert_eq!(error.to_string(), "cannot translate break: `break` outside of a loop");
}

#[test]
fn break_in_nested_function_is_not_in_loop() {
    let error = generation_error("while true {\n    func g() { continue }\n}");
    assert!(matches!(
        error,
        CodeGenError::NoMapping {
            construct: "continue",
            ..
        }
    ));
    assert_eq!(error.position(), Some(Position::new(2, 16)));
}

#[test]
fn return_outside_function_has_no_mapping() {
    let error = generation_error("if true { return 1 }");
    assert!(matches!(
        error,
        CodeGenError::NoMapping {
            construct: "return",
            ..
        }
    ));
}

#[test]
fn class_body_rejects_statements() {
    let error = generation_error("class Thing {\n    print(1)\n}");
    assert!(matches!(
        error,
        CodeGenError::NoMapping {
            construct: "print",
            ..
        }
    ));
}

#[test]
fn required_parameter_after_default_has_no_mapping() {
    let error = generation_error("func f(a = 1, b) {}");
    assert!(matches!(
        error,
        CodeGenError::NoMapping {
            construct: "parameter",
            ..
        }
    ));
}

#[test]
fn duplicate_declaration_is_a_semantic_error() {
    let error = generation_error("let x = 1\nlet x = 2");
    let CodeGenError::Semantic(semantic) = &error else {
        panic!("expected a semantic error, got {error:?}");
    };
    assert_eq!(semantic.kind, ScopeError::DuplicateBinding { name: "x".into() });
    assert_eq!(error.position(), Some(Position::new(2, 5)));
}

#[test]
fn constant_and_undefined_assignments_fail() {
    let error = generation_error("const k = 1\nk = 2");
    assert!(matches!(
        error,
        CodeGenError::Semantic(SemanticError {
            kind: ScopeError::ConstAssignment { .. },
            ..
        })
    ));

    let error = generation_error("y = 3");
    assert!(matches!(
        error,
        CodeGenError::Semantic(SemanticError {
            kind: ScopeError::UndefinedName { .. },
            ..
        })
    ));
}

#[test]
fn duplicate_function_names_fail_when_hoisted() {
    let error = generation_error("func f() {}\nfunc f() {}");
    assert!(matches!(error, CodeGenError::Semantic(_)));
    assert_eq!(error.position(), Some(Position::new(2, 6)));
}

// ========================================================================
// Header, warnings and source maps
// ========================================================================

#[test]
fn header_imports_runtime() {
    let generated = generate_with("let x = 1", CodegenOptions::new()).expect("generates");
    assert_eq!(
        generated.code,
        "# Auto-generated from Sona source code\nfrom sona.runtime import *\n\nx = 1\n"
    );

    let generated = generate_with("let x = 1", CodegenOptions::new().with_runtime_module(None))
        .expect("generates");
    assert_eq!(generated.code, "# Auto-generated from Sona source code\n\nx = 1\n");

    let generated = generate_with(
        "let x = 1",
        CodegenOptions::new().with_runtime_module(Some("my.rt".into())),
    )
    .expect("generates");
    assert!(generated.code.contains("from my.rt import *\n"));
}

#[test]
fn unresolved_names_become_warnings() {
    let generated = generate_with(
        "print(later)\nprint(later)",
        CodegenOptions::new().with_header(false),
    )
    .expect("generation should succeed");
    assert_eq!(generated.warnings.len(), 1);
    let warning = &generated.warnings[0];
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.message, "`later` is never defined in this program");
    assert_eq!(warning.position, Position::new(1, 7));
    assert_eq!(warning.hint.as_deref(), Some("the runtime must provide it (2 uses)"));
}

#[test]
fn names_bound_after_a_function_are_not_warned() {
    let generated = generate_with(
        "func g() { return h }\nlet h = 5",
        CodegenOptions::new().with_header(false),
    )
    .expect("generation should succeed");
    assert!(generated.warnings.is_empty());
}

#[test]
fn source_map_points_at_statements() {
    let generated = generate_with("let x = 1\nfunc f() {\n    print(x)\n}", CodegenOptions::new())
        .expect("generates");
    let map = generated.source_map.expect("source maps are on by default");
    let positions: Vec<_> = map
        .mappings
        .iter()
        .map(|mapping| (mapping.generated, mapping.source))
        .collect();
    assert_eq!(
        positions,
        vec![
            (
                GeneratedPosition { line: 4, column: 0 },
                SourcePosition { line: 1, column: 1 }
            ),
            (
                GeneratedPosition { line: 5, column: 0 },
                SourcePosition { line: 2, column: 1 }
            ),
            (
                GeneratedPosition { line: 6, column: 4 },
                SourcePosition { line: 3, column: 5 }
            ),
        ]
    );
    assert_eq!(map.mappings[0].name.as_deref(), Some("x"));
}

#[test]
fn source_maps_can_be_disabled() {
    let generated = generate_with("let x = 1", CodegenOptions::new().with_source_maps(false))
        .expect("generates");
    assert!(generated.source_map.is_none());
}

#[test]
fn generator_is_reusable_after_errors() {
    let mut generator = PythonGenerator::new(CodegenOptions::new().with_header(false));
    let first = generator
        .generate(&program("let x = 1"), "a.sona")
        .expect("generates");
    assert!(generator.generate(&program("break"), "b.sona").is_err());
    let again = generator
        .generate(&program("let x = 1"), "a.sona")
        .expect("generates");
    assert_eq!(first, again);
}
