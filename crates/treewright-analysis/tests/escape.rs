// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Escape analysis over parsed methods.

use std::sync::Arc;

use treewright_analysis::{EscapeAnalysis, EscapeKind};
use treewright_lst::parser::JavaParser;
use treewright_lst::visitor;
use treewright_lst::{CompilationUnit, Tree, TreeKind};

fn parse(body: &str) -> Arc<CompilationUnit> {
    let source = format!(
        "class A {{\n    Object field;\n    void consume(Object o) {{}}\n{}}}\n",
        body
    );
    let units = JavaParser::new()
        .parse(&[("A.java", source.as_str())])
        .expect("parse failed");
    units[0].clone()
}

fn method(unit: &Arc<CompilationUnit>, name: &str) -> Tree {
    visitor::find_all(&Tree::from(unit.clone()), TreeKind::MethodDeclaration)
        .into_iter()
        .find(|m| m.simple_name() == Some(name))
        .expect("method not found")
}

/// `(kind, leaking name)` for every escape in `name`.
fn escapes(body: &str, name: &str) -> Vec<(EscapeKind, String)> {
    let unit = parse(body);
    EscapeAnalysis::find_escapes(&method(&unit, name), &unit.types)
        .into_iter()
        .map(|e| (e.kind, e.leaking.simple_name.clone()))
        .collect()
}

#[test]
fn returned_local_escapes_at_the_return() {
    let unit = parse("    Object foo() { Object local = new Object(); return local; }\n");
    let foo = method(&unit, "foo");
    let found = EscapeAnalysis::find_escapes(&foo, &unit.types);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, EscapeKind::Return);
    assert_eq!(found[0].site.kind(), TreeKind::Return);
    assert_eq!(found[0].leaking.simple_name, "local");

    let returned = visitor::find_all(&foo, TreeKind::Return);
    let expression = returned[0]
        .as_return()
        .and_then(|r| r.expression.clone())
        .unwrap();
    assert_eq!(found[0].leaking.id, expression.id());
}

#[test]
fn unused_local_does_not_escape() {
    assert!(escapes("    void foo() { Object local = new Object(); }\n", "foo").is_empty());
}

#[test]
fn field_assignment_escapes() {
    let found = escapes(
        "    void foo() { Object local = new Object(); field = local; }\n",
        "foo",
    );
    assert_eq!(found, vec![(EscapeKind::NonLocalAssignment, "local".to_string())]);
}

#[test]
fn array_element_assignment_escapes() {
    let body = "    void foo(Object[] arr) { Object local = new Object(); arr[0] = local; }\n";
    let unit = parse(body);
    let foo = method(&unit, "foo");
    assert!(visitor::find_all(&foo, TreeKind::Erroneous).is_empty());

    let found = EscapeAnalysis::find_escapes(&foo, &unit.types);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, EscapeKind::NonLocalAssignment);
    assert_eq!(found[0].site.kind(), TreeKind::Assignment);
    assert_eq!(found[0].leaking.simple_name, "local");
}

#[test]
fn nested_local_assignment_stays() {
    let found = escapes(
        "    void foo() { Object local = new Object(); { Object inner; inner = local; } }\n",
        "foo",
    );
    assert!(found.is_empty());
}

#[test]
fn assignment_to_enclosing_local_escapes() {
    let found = escapes(
        "    void foo() { Object outer; { Object inner = new Object(); outer = inner; } }\n",
        "foo",
    );
    assert_eq!(found, vec![(EscapeKind::NonLocalAssignment, "inner".to_string())]);
}

#[test]
fn arguments_escape() {
    let found = escapes(
        "    void foo() { Object local = new Object(); consume(local); new Object(); }\n",
        "foo",
    );
    assert_eq!(found, vec![(EscapeKind::Argument, "local".to_string())]);
}

#[test]
fn ternary_branches_are_unwrapped() {
    let found = escapes(
        "    Object foo(boolean b) { Object x = new Object(); Object y = null; return b ? x : (y); }\n",
        "foo",
    );
    assert_eq!(
        found,
        vec![
            (EscapeKind::Return, "x".to_string()),
            (EscapeKind::Return, "y".to_string()),
        ]
    );
}

#[test]
fn parameters_and_primitives_never_escape() {
    let found = escapes(
        "    Object foo(Object param) { int count = 1; consume(param); field = param; return count; }\n",
        "foo",
    );
    assert!(found.is_empty());

    let unit = parse("    Object foo(Object p) { return p; }\n");
    let leaking = EscapeAnalysis::leaking_identifiers(&method(&unit, "foo"), &unit.types);
    assert!(leaking.is_empty());
}
