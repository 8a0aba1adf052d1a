// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Matchers against parsed and attributed source.

use std::sync::Arc;

use treewright_analysis::{AnnotationMatcher, MethodMatcher, TypeMatcher};
use treewright_lst::parser::JavaParser;
use treewright_lst::visitor;
use treewright_lst::{CompilationUnit, Tree, TreeKind};

const SOURCE: &str = "package p;

import java.util.ArrayList;
import java.util.List;
import java.util.concurrent.Future;

class Holder {
    List<String> names;
    Future<String> pending;
    ArrayList<String> items;
    int count;

    @SuppressWarnings(\"unchecked\")
    void fill() {
        names.add(\"a\");
        names.add(0, \"b\");
        items.add(\"c\");
        names.size();
    }

    @Deprecated(since = \"1.2\", forRemoval = true)
    void old() {
    }
}
";

fn parse() -> Arc<CompilationUnit> {
    let units = JavaParser::new()
        .parse(&[("p/Holder.java", SOURCE)])
        .expect("parse failed");
    units[0].clone()
}

/// Names of the fields whose type matches.
fn matching_fields(unit: &Arc<CompilationUnit>, matcher: &TypeMatcher) -> Vec<String> {
    let tree = Tree::from(unit.clone());
    visitor::find_all(&tree, TreeKind::NamedVariable)
        .into_iter()
        .filter(|v| matcher.matches(v, &unit.types))
        .filter_map(|v| v.simple_name().map(str::to_string))
        .collect()
}

/// Printed source of the invocations the matcher accepts.
fn matching_calls(unit: &Arc<CompilationUnit>, matcher: &MethodMatcher) -> Vec<String> {
    use treewright_lst::Codegen;

    let tree = Tree::from(unit.clone());
    visitor::find_all(&tree, TreeKind::MethodInvocation)
        .into_iter()
        .filter(|call| matcher.matches(call, &unit.types))
        .map(|call| call.print().trim().to_string())
        .collect()
}

#[test]
fn package_wildcard_matches_direct_members_only() {
    let unit = parse();
    let matcher = TypeMatcher::new("java.util.*", false).unwrap();
    assert_eq!(matching_fields(&unit, &matcher), vec!["names", "items"]);

    let deep = TypeMatcher::new("java.util..*", false).unwrap();
    assert_eq!(
        matching_fields(&unit, &deep),
        vec!["names", "pending", "items"]
    );
}

#[test]
fn subtypes_are_matched_on_request() {
    let unit = parse();
    let exact = TypeMatcher::new("java.util.Collection", false).unwrap();
    assert!(matching_fields(&unit, &exact).is_empty());

    let subtypes = TypeMatcher::new("java.util.Collection", true).unwrap();
    assert_eq!(matching_fields(&unit, &subtypes), vec!["names", "items"]);
}

#[test]
fn primitives_match_by_keyword() {
    let unit = parse();
    let matcher = TypeMatcher::new("int", false).unwrap();
    assert_eq!(matching_fields(&unit, &matcher), vec!["count"]);
}

#[test]
fn any_params_versus_no_params() {
    let unit = parse();
    let any = MethodMatcher::new("java.util.List add(..)", false).unwrap();
    assert_eq!(
        matching_calls(&unit, &any),
        vec!["names.add(\"a\")", "names.add(0, \"b\")"]
    );

    let none = MethodMatcher::new("java.util.List add()", false).unwrap();
    assert!(matching_calls(&unit, &none).is_empty());
}

#[test]
fn exact_parameter_list() {
    let unit = parse();
    let matcher = MethodMatcher::new("java.util.List add(int, java.lang.Object)", false).unwrap();
    assert_eq!(matching_calls(&unit, &matcher), vec!["names.add(0, \"b\")"]);
}

#[test]
fn overrides_reach_implementations() {
    let unit = parse();
    let matcher = MethodMatcher::new("java.util.List add(..)", true).unwrap();
    assert_eq!(
        matching_calls(&unit, &matcher),
        vec!["names.add(\"a\")", "names.add(0, \"b\")", "items.add(\"c\")"]
    );
}

#[test]
fn declarations_match_with_enclosing_class() {
    let unit = parse();
    let tree = Tree::from(unit.clone());
    let class = visitor::find_all(&tree, TreeKind::ClassDeclaration)
        .into_iter()
        .next()
        .unwrap();
    let class = class.as_class_declaration().unwrap();
    let methods = visitor::find_all(&tree, TreeKind::MethodDeclaration);

    let matcher = MethodMatcher::new("p.Holder fill()", false).unwrap();
    let matched: Vec<&str> = methods
        .iter()
        .filter_map(|m| m.as_method_declaration())
        .filter(|m| matcher.matches_declaration(m, class, &unit.types))
        .map(|m| m.simple_name())
        .collect();
    assert_eq!(matched, vec!["fill"]);
}

#[test]
fn annotation_arguments_are_a_subset() {
    let unit = parse();
    let tree = Tree::from(unit.clone());
    let annotations = visitor::find_all(&tree, TreeKind::Annotation);
    let count = |pattern: &str| {
        let matcher = AnnotationMatcher::new(pattern).unwrap();
        annotations
            .iter()
            .filter(|a| matcher.matches(a, &unit.types))
            .count()
    };

    assert_eq!(count("@java.lang.SuppressWarnings"), 1);
    assert_eq!(count("@java.lang.SuppressWarnings(\"unchecked\")"), 1);
    assert_eq!(count("@java.lang.SuppressWarnings(\"rawtypes\")"), 0);
    assert_eq!(count("@java.lang.Deprecated(forRemoval = true)"), 1);
    assert_eq!(count("@java.lang.Deprecated(since = \"2.0\")"), 0);
    assert_eq!(count("@java.lang.*"), 2);
}

#[test]
fn malformed_patterns_name_the_fragment() {
    let err = MethodMatcher::new("java.util.List add(..", false).unwrap_err();
    assert_eq!(err.pattern(), "java.util.List add(..");

    let err = TypeMatcher::new("java.util.", false).unwrap_err();
    assert!(err.to_string().contains("java.util."));

    assert!(AnnotationMatcher::new("java.lang.Deprecated").is_err());
    assert!(TypeMatcher::new("", false).is_err());
}
