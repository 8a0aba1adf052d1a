// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Traversal tests: ordering, copy-on-write identity, deletion, stopping,
//! skipping, and cursor context.

use std::sync::Arc;

use treewright_lst::cursor::Cursor;
use treewright_lst::parser::JavaParser;
use treewright_lst::visitor::{self, IsoVisitor, TreeVisitor, VisitResult};
use treewright_lst::{Codegen, Identifier, Tree, TreeKind};

fn parse(source: &str) -> Tree {
    let units = JavaParser::new()
        .parse(&[("A.java", source)])
        .expect("parse failed");
    Tree::from(units[0].clone())
}

/// Appends `1` to every identifier, optionally stopping at one name.
struct Suffix {
    stop_at: Option<&'static str>,
}

impl IsoVisitor<()> for Suffix {
    fn pre_visit(&mut self, tree: &Tree, _cursor: &mut Cursor, _p: &mut ()) -> VisitResult {
        match (self.stop_at, tree.as_identifier()) {
            (Some(stop), Some(ident)) if ident.simple_name == stop => VisitResult::Stop,
            _ => VisitResult::Continue,
        }
    }

    fn visit_identifier(
        &mut self,
        node: Arc<Identifier>,
        _cursor: &mut Cursor,
        _p: &mut (),
    ) -> Arc<Identifier> {
        let name = format!("{}1", node.simple_name);
        node.with_simple_name(name)
    }
}

struct Nothing;

impl IsoVisitor<()> for Nothing {}

#[test]
fn unchanged_traversal_returns_same_root() {
    let tree = parse("class A {\n    int x = 1;\n    void m(int y) { x = y; }\n}\n");
    let result = Nothing.visit_root(tree.clone(), &mut ()).unwrap();
    assert!(result.ptr_eq(&tree));
}

#[test]
fn change_rebuilds_only_the_path_to_root() {
    let tree = parse("class A {\n    int x;\n}\nclass B {\n    int y;\n}\n");

    struct RenameY;
    impl IsoVisitor<()> for RenameY {
        fn visit_identifier(
            &mut self,
            node: Arc<Identifier>,
            _cursor: &mut Cursor,
            _p: &mut (),
        ) -> Arc<Identifier> {
            if node.simple_name == "y" {
                node.with_simple_name("z".to_string())
            } else {
                node
            }
        }
    }

    let result = RenameY.visit_root(tree.clone(), &mut ()).unwrap();
    assert!(!result.ptr_eq(&tree));
    assert_eq!(result.print(), "class A {\n    int x;\n}\nclass B {\n    int z;\n}\n");

    let before = tree.as_compilation_unit().unwrap();
    let after = result.as_compilation_unit().unwrap();
    assert_eq!(before.id, after.id);
    assert!(before.classes[0].ptr_eq(&after.classes[0]));
    assert!(!before.classes[1].ptr_eq(&after.classes[1]));
    assert_eq!(before.classes[1].id(), after.classes[1].id());
}

#[test]
fn pre_visit_runs_parent_before_children() {
    let tree = parse("class A { int x; }");
    let kinds = visitor::collect(&tree, |t, _| Some(t.kind()));
    assert_eq!(kinds[0], TreeKind::CompilationUnit);
    assert_eq!(kinds[1], TreeKind::ClassDeclaration);

    let names = visitor::collect(&tree, |t, _| t.as_identifier().map(|i| i.simple_name.clone()));
    assert_eq!(names, vec!["A".to_string(), "x".to_string()]);
}

#[test]
fn delete_statement_from_block() {
    let tree = parse(
        "class A {\n    void m() {\n        int a = 1;\n        int b = 2;\n    }\n}\n",
    );

    struct DeleteA;
    impl TreeVisitor<()> for DeleteA {
        fn post_visit(&mut self, tree: Tree, _cursor: &mut Cursor, _p: &mut ()) -> Option<Tree> {
            let declares_a = tree
                .as_variable_declarations()
                .is_some_and(|v| v.named_variables().any(|n| n.simple_name() == "a"));
            if declares_a {
                None
            } else {
                Some(tree)
            }
        }
    }

    let result = DeleteA.visit_root(tree, &mut ()).unwrap();
    assert_eq!(
        result.print(),
        "class A {\n    void m() {\n        int b = 2;\n    }\n}\n"
    );
}

#[test]
fn deletion_in_required_slot_keeps_child() {
    let tree = parse("class A { void m() { x = y; } }");

    struct DeleteIdentifiers;
    impl TreeVisitor<()> for DeleteIdentifiers {
        fn visit_identifier(
            &mut self,
            _node: Arc<Identifier>,
            _cursor: &mut Cursor,
            _p: &mut (),
        ) -> Option<Tree> {
            None
        }
    }

    let result = DeleteIdentifiers.visit_root(tree.clone(), &mut ()).unwrap();
    assert_eq!(result.print(), tree.print());
}

#[test]
fn stop_keeps_earlier_changes_only() {
    let tree = parse("class A { int a; int b; int c; }");
    let result = Suffix { stop_at: Some("b") }
        .visit_root(tree, &mut ())
        .unwrap();
    assert_eq!(result.print(), "class A1 { int a1; int b; int c; }");
}

#[test]
fn skip_children_still_calls_post_visit() {
    let tree = parse("class A {\n    int a;\n    void m() { int b; }\n}\n");

    #[derive(Default)]
    struct SkipMethods {
        post_visited_methods: usize,
    }

    impl TreeVisitor<()> for SkipMethods {
        fn pre_visit(&mut self, tree: &Tree, _cursor: &mut Cursor, _p: &mut ()) -> VisitResult {
            if tree.kind() == TreeKind::MethodDeclaration {
                VisitResult::SkipChildren
            } else {
                VisitResult::Continue
            }
        }

        fn post_visit(&mut self, tree: Tree, _cursor: &mut Cursor, _p: &mut ()) -> Option<Tree> {
            if tree.kind() == TreeKind::MethodDeclaration {
                self.post_visited_methods += 1;
            }
            Some(tree)
        }

        fn visit_identifier(
            &mut self,
            node: Arc<Identifier>,
            _cursor: &mut Cursor,
            _p: &mut (),
        ) -> Option<Tree> {
            let name = node.simple_name.to_uppercase();
            Some(Tree::from(node.with_simple_name(name)))
        }
    }

    let mut skipper = SkipMethods::default();
    let result = skipper.visit_root(tree, &mut ()).unwrap();
    assert_eq!(skipper.post_visited_methods, 1);
    assert_eq!(
        result.print(),
        "class A {\n    int A;\n    void m() { int b; }\n}\n"
    );
}

#[test]
fn cursor_knows_enclosing_method() {
    let tree = parse("class A {\n    int f;\n    void m(int p) { int l = p; }\n}\n");
    let found = visitor::collect(&tree, |t, cursor| {
        let ident = t.as_identifier()?;
        let method = cursor
            .first_enclosing(TreeKind::MethodDeclaration)
            .and_then(|m| m.as_method_declaration())
            .map(|m| m.simple_name().to_string());
        Some((ident.simple_name.clone(), method))
    });

    assert!(found.contains(&("f".to_string(), None)));
    assert!(found.contains(&("l".to_string(), Some("m".to_string()))));
    assert!(found.contains(&("p".to_string(), Some("m".to_string()))));
}

#[test]
fn messages_reach_enclosing_class() {
    let tree = parse("class A { int a; int b; }\nclass B { int c; }\n");

    #[derive(Default)]
    struct CountFields {
        counts: Vec<(String, usize)>,
    }

    impl TreeVisitor<()> for CountFields {
        fn pre_visit(&mut self, tree: &Tree, cursor: &mut Cursor, _p: &mut ()) -> VisitResult {
            if tree.kind() == TreeKind::NamedVariable {
                let count = cursor
                    .nearest_message::<usize>("fields")
                    .copied()
                    .unwrap_or(0);
                cursor.put_message_on_first_enclosing(
                    TreeKind::ClassDeclaration,
                    "fields",
                    count + 1,
                );
            }
            VisitResult::Continue
        }

        fn post_visit(&mut self, tree: Tree, cursor: &mut Cursor, _p: &mut ()) -> Option<Tree> {
            if let Some(class) = tree.as_class_declaration() {
                let count = cursor.get_message::<usize>("fields").copied().unwrap_or(0);
                self.counts.push((class.simple_name().to_string(), count));
            }
            Some(tree)
        }
    }

    let mut counter = CountFields::default();
    counter.visit_root(tree, &mut ());
    assert_eq!(
        counter.counts,
        vec![("A".to_string(), 2), ("B".to_string(), 1)]
    );
}

#[test]
fn find_all_returns_nodes_of_kind() {
    let tree = parse("class A { void m() { a(); b(); } void n() { c(); } }");
    let calls = visitor::find_all(&tree, TreeKind::MethodInvocation);
    let names: Vec<_> = calls.iter().filter_map(|c| c.simple_name()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}
