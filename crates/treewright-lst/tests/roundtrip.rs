// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Round-trip tests for the reference front-end.
//!
//! These tests verify that `parse(source).print() == source` byte for byte,
//! including sources that only partially parse (unsupported constructs are
//! kept as erroneous nodes).
//!
//! # Adding New Tests
//!
//! Create a `.java` file in `tests/fixtures/` and add a corresponding
//! `roundtrip_fixture_<name>` test function.

use std::path::PathBuf;

use difference::assert_diff;
use itertools::Itertools;
use treewright_lst::parser::JavaParser;
use treewright_lst::{Codegen, PrintOptions};

/// Helper to visualize whitespace differences in test output
fn visualize(s: &str) -> String {
    s.replace(' ', "▩").replace('\t', "→").lines().join("↩\n")
}

fn assert_roundtrip(input: &str, label: &str) {
    let units = JavaParser::new()
        .parse(&[(label, input)])
        .unwrap_or_else(|e| panic!("{}: {}", label, e));
    let generated = units[0].print_with(&PrintOptions::sanitized());

    if generated != input {
        let got = visualize(&generated);
        let expected = visualize(input);
        assert_diff!(expected.as_ref(), got.as_ref(), "", 0);
    }
}

fn assert_roundtrip_fixture(fixture_name: &str) {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(fixture_name);

    let contents = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", fixture_name, e));

    assert_roundtrip(&contents, fixture_name);
}

// =============================================================================
// Fixture-based round-trip tests
// =============================================================================

#[test]
fn roundtrip_fixture_comments() {
    assert_roundtrip_fixture("comments.java");
}

#[test]
fn roundtrip_fixture_declarations() {
    assert_roundtrip_fixture("declarations.java");
}

#[test]
fn roundtrip_fixture_expressions() {
    assert_roundtrip_fixture("expressions.java");
}

#[test]
fn roundtrip_fixture_statements() {
    assert_roundtrip_fixture("statements.java");
}

#[test]
fn roundtrip_fixture_whitespace() {
    assert_roundtrip_fixture("whitespace.java");
}

// =============================================================================
// Inline round-trip tests
// =============================================================================

#[test]
fn roundtrip_empty_source() {
    assert_roundtrip("", "Empty.java");
}

#[test]
fn roundtrip_only_comments() {
    assert_roundtrip("// nothing here\n/* at all */", "Comments.java");
}

#[test]
fn roundtrip_no_trailing_newline() {
    assert_roundtrip("class A {}", "A.java");
}

#[test]
fn roundtrip_crlf_line_endings() {
    assert_roundtrip("class A {\r\n    int x; // c\r\n}\r\n", "A.java");
}

#[test]
fn roundtrip_generics_closing_together() {
    assert_roundtrip(
        "import java.util.*;\nclass A { Map<String, List<List<Integer>>> m; }\n",
        "A.java",
    );
}

#[test]
fn roundtrip_method_chain() {
    assert_roundtrip(
        "class A {\n    void m(StringBuilder b) {\n        b\n            .append(1)\n            .append(\"x\") // why\n            .toString();\n    }\n}\n",
        "A.java",
    );
}

#[test]
fn roundtrip_unparseable_member() {
    assert_roundtrip(
        "class A {\n    int x = 1;\n    int[] y = {1, 2};\n    void m() {}\n}\n",
        "A.java",
    );
}

#[test]
fn roundtrip_stray_tokens_at_top_level() {
    assert_roundtrip("class A {}\n}\n;\nclass B {}\n", "A.java");
}

#[test]
fn roundtrip_text_block() {
    assert_roundtrip(
        "class A {\n    String s = \"\"\"\n        hello\n        \"\"\";\n}\n",
        "A.java",
    );
}
