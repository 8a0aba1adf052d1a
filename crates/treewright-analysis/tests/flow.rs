// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Local data and taint flow over parsed methods.

use treewright_analysis::{FlowState, LocalFlow, LocalFlowSpec};
use treewright_core::NodeId;
use treewright_lst::cursor::Cursor;
use treewright_lst::parser::JavaParser;
use treewright_lst::visitor;
use treewright_lst::{Tree, TreeKind};

const SOURCE: &str = "class Flows {
    String source() { return \"\"; }
    void sink(Object o) {}
    String clean(String s) { return s; }
    boolean isSafe(String s) { return true; }

    void direct() {
        String s = source();
        sink(s);
    }

    void chain() {
        String a = source();
        String b = a;
        String c = (b);
        sink(c);
    }

    void concat() {
        String s = source();
        sink(s + \"!\");
    }

    void reassigned() {
        String s = source();
        s = \"safe\";
        sink(s);
    }

    void branches(boolean flag) {
        String s = \"safe\";
        if (flag) {
            s = source();
        }
        sink(s);
    }

    void guarded() {
        String s = source();
        if (isSafe(s)) {
            sink(s);
        } else {
            sink(s);
        }
    }

    void loop() {
        String s = \"\";
        String t = \"\";
        while (t.isEmpty()) {
            sink(s);
            s = t;
            t = source();
        }
    }

    void ternary(boolean flag) {
        String s = source();
        sink(flag ? s : \"x\");
    }

    void wrapped() {
        String w = clean(source());
        sink(w);
    }
}
";

/// Sources are calls to `source()`, sinks are arguments of `sink(..)`.
#[derive(Default)]
struct Calls {
    steps_through: Option<&'static str>,
    guard: Option<&'static str>,
}

fn is_call(tree: &Tree, name: &str) -> bool {
    tree.kind() == TreeKind::MethodInvocation && tree.simple_name() == Some(name)
}

impl LocalFlowSpec for Calls {
    fn is_source(&self, tree: &Tree, _cursor: &Cursor) -> bool {
        is_call(tree, "source")
    }

    fn is_sink(&self, _tree: &Tree, cursor: &Cursor) -> bool {
        cursor.parent().is_some_and(|p| is_call(p, "sink"))
    }

    fn is_additional_flow_step(&self, _from: &Tree, to: &Tree, _cursor: &Cursor) -> bool {
        self.steps_through.is_some_and(|name| is_call(to, name))
    }

    fn is_barrier_guard(&self, condition: &Tree, _cursor: &Cursor) -> bool {
        self.guard.is_some_and(|name| is_call(condition, name))
    }
}

fn method(name: &str) -> Tree {
    let units = JavaParser::new()
        .parse(&[("Flows.java", SOURCE)])
        .expect("parse failed");
    visitor::find_all(&Tree::from(units[0].clone()), TreeKind::MethodDeclaration)
        .into_iter()
        .find(|m| m.simple_name() == Some(name))
        .expect("method not found")
}

/// Ids of the arguments passed to `sink(..)`, in source order.
fn sink_arguments(method: &Tree) -> Vec<NodeId> {
    visitor::find_all(method, TreeKind::MethodInvocation)
        .iter()
        .filter(|t| is_call(t, "sink"))
        .filter_map(|t| t.as_method_invocation())
        .filter_map(|call| call.arguments.real_elements().next().map(Tree::id))
        .collect()
}

fn source_calls(method: &Tree) -> Vec<NodeId> {
    visitor::find_all(method, TreeKind::MethodInvocation)
        .iter()
        .filter(|t| is_call(t, "source"))
        .map(Tree::id)
        .collect()
}

#[test]
fn direct_assignment_reaches_sink() {
    let m = method("direct");
    let result = LocalFlow::data().analyze(&Calls::default(), &m);

    let source = source_calls(&m)[0];
    let sink = sink_arguments(&m)[0];
    assert_eq!(result.paths().len(), 1);
    assert_eq!(result.sinks_for(source), vec![sink]);
    assert_eq!(result.sources_for(sink), vec![source]);
    assert_eq!(result.state_of(sink), FlowState::SinkHit);
    assert_eq!(result.state_of(source), FlowState::Tracked);
}

#[test]
fn assignment_chain_and_parentheses() {
    let m = method("chain");
    let result = LocalFlow::data().analyze(&Calls::default(), &m);
    assert_eq!(result.paths().len(), 1);
}

#[test]
fn concatenation_is_taint_only() {
    let m = method("concat");
    assert!(LocalFlow::data().analyze(&Calls::default(), &m).is_empty());
    assert_eq!(
        LocalFlow::taint().analyze(&Calls::default(), &m).paths().len(),
        1
    );
}

#[test]
fn reassignment_kills_tracking() {
    let m = method("reassigned");
    let result = LocalFlow::taint().analyze(&Calls::default(), &m);
    assert!(result.is_empty());
    assert_eq!(result.state_of(sink_arguments(&m)[0]), FlowState::Unvisited);
}

#[test]
fn branches_are_joined() {
    let m = method("branches");
    let result = LocalFlow::data().analyze(&Calls::default(), &m);
    assert_eq!(result.paths().len(), 1);
}

#[test]
fn barrier_guard_protects_then_branch_only() {
    let m = method("guarded");
    let sinks = sink_arguments(&m);

    let unguarded = LocalFlow::data().analyze(&Calls::default(), &m);
    assert_eq!(unguarded.paths().len(), 2);

    let spec = Calls {
        guard: Some("isSafe"),
        ..Calls::default()
    };
    let guarded = LocalFlow::data().analyze(&spec, &m);
    assert_eq!(guarded.paths().len(), 1);
    assert_eq!(guarded.paths()[0].sink, sinks[1]);
    assert_eq!(guarded.state_of(sinks[0]), FlowState::Unvisited);
}

#[test]
fn loop_carries_values_around() {
    let m = method("loop");
    let result = LocalFlow::data().analyze(&Calls::default(), &m);
    assert_eq!(result.paths().len(), 1);
}

#[test]
fn both_ternary_branches_flow() {
    let m = method("ternary");
    let result = LocalFlow::data().analyze(&Calls::default(), &m);
    assert_eq!(result.paths().len(), 1);
}

#[test]
fn additional_steps_cross_calls() {
    let m = method("wrapped");
    assert!(LocalFlow::taint().analyze(&Calls::default(), &m).is_empty());

    let spec = Calls {
        steps_through: Some("clean"),
        ..Calls::default()
    };
    assert_eq!(LocalFlow::data().analyze(&spec, &m).paths().len(), 1);
}
