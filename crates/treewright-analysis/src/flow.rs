// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Local source-to-sink flow.
//!
//! A [`LocalFlowSpec`] names the sources and sinks; [`LocalFlow::analyze`]
//! walks one scope (a method, a block, or a class whose methods are then
//! analyzed one at a time) in source order and records every path from a
//! source node to a sink node.
//!
//! Values travel through:
//!
//! - variable initializers and plain assignments
//! - parentheses and both branches of a ternary
//! - `return` and `throw` statements and method/constructor arguments, which
//!   are where sinks are usually found
//! - whatever the caller declares with
//!   [`is_additional_flow_step`](LocalFlowSpec::is_additional_flow_step)
//!
//! [`FlowMode::Taint`] also follows values derived from a tracked value:
//! binary and unary operators and compound assignments. [`FlowMode::Data`]
//! follows only identity-preserving chains; a compound assignment ends
//! tracking of the assigned variable.
//!
//! Branches are joined at the end of an `if`, and `while` bodies are
//! re-analyzed until the variable state stops changing. A condition the
//! caller reports as a barrier guard clears the variables it mentions on the
//! guarded (then) branch only.
//!
//! # Limitations
//!
//! The analysis is intraprocedural and unsound. Calls are opaque: nothing
//! flows into a callee or back out of it unless the caller adds the step. Field
//! state is tracked only by the field's resolved type, so aliasing through
//! other references is invisible. Anonymous class bodies and nested classes
//! are not entered. Breaks out of loops are not modeled.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, trace};
use treewright_core::NodeId;
use treewright_lst::cursor::Cursor;
use treewright_lst::types::TypeId;
use treewright_lst::visitor::{self, TreeVisitor, VisitResult};
use treewright_lst::{
    Assignment, Binary, Block, ClassDeclaration, FieldAccess, Identifier, If, MethodDeclaration,
    MethodInvocation, NamedVariable, NewClass, Ternary, Tree, Unary, WhileLoop,
};

/// Re-analysis passes over a loop body before giving up on a fixpoint.
const MAX_LOOP_PASSES: usize = 32;

/// Predicates that define a flow question.
pub trait LocalFlowSpec {
    fn is_source(&self, tree: &Tree, cursor: &Cursor) -> bool;

    /// Checked against every node whose value carries a source. For a call,
    /// that is usually an argument, with the call as the cursor's parent.
    fn is_sink(&self, tree: &Tree, cursor: &Cursor) -> bool;

    /// Whether a tracked `from` makes `to` tracked, for an edge the analysis
    /// does not follow by itself (such as a call that returns its argument).
    #[allow(unused_variables)]
    fn is_additional_flow_step(&self, from: &Tree, to: &Tree, cursor: &Cursor) -> bool {
        false
    }

    /// Whether `condition` proves that the variables it mentions are clean
    /// when it holds.
    #[allow(unused_variables)]
    fn is_barrier_guard(&self, condition: &Tree, cursor: &Cursor) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowMode {
    /// Identity-preserving assignment chains only.
    #[default]
    Data,
    /// Also values computed from a tracked value.
    Taint,
}

/// Per-node state, ordered by progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FlowState {
    #[default]
    Unvisited,
    /// The node's value carries at least one source.
    Tracked,
    /// A sink that a tracked value reached.
    SinkHit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowPath {
    pub source: NodeId,
    pub sink: NodeId,
}

#[derive(Debug, Clone, Default)]
pub struct FlowResult {
    paths: Vec<FlowPath>,
    states: HashMap<NodeId, FlowState>,
}

impl FlowResult {
    /// Every source-to-sink path, ordered by source then sink id.
    pub fn paths(&self) -> &[FlowPath] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn state_of(&self, id: NodeId) -> FlowState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    pub fn sinks_for(&self, source: NodeId) -> Vec<NodeId> {
        self.paths
            .iter()
            .filter(|p| p.source == source)
            .map(|p| p.sink)
            .collect()
    }

    pub fn sources_for(&self, sink: NodeId) -> Vec<NodeId> {
        self.paths
            .iter()
            .filter(|p| p.sink == sink)
            .map(|p| p.source)
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LocalFlow {
    mode: FlowMode,
}

impl LocalFlow {
    pub fn new(mode: FlowMode) -> Self {
        Self { mode }
    }

    pub fn data() -> Self {
        Self::new(FlowMode::Data)
    }

    pub fn taint() -> Self {
        Self::new(FlowMode::Taint)
    }

    pub fn mode(&self) -> FlowMode {
        self.mode
    }

    /// Analyze `scope`, which is typically a method declaration or a block.
    pub fn analyze<S: LocalFlowSpec + ?Sized>(&self, spec: &S, scope: &Tree) -> FlowResult {
        let mut analyzer = Analyzer {
            spec,
            mode: self.mode,
            root: scope.id(),
            vars: Vars::new(),
            value: Sources::new(),
            paths: BTreeSet::new(),
            states: HashMap::new(),
        };
        analyzer.visit_root(scope.clone(), &mut ());
        debug!(
            mode = ?self.mode,
            scope = ?scope.kind(),
            paths = analyzer.paths.len(),
            "local flow analyzed"
        );
        FlowResult {
            paths: analyzer.paths.into_iter().collect(),
            states: analyzer.states,
        }
    }
}

/// Source node ids carried by a value.
type Sources = BTreeSet<NodeId>;

/// A variable: by resolved variable type when attributed, by name otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum VarKey {
    Typed(TypeId),
    Named(String),
}

type Vars = HashMap<VarKey, Sources>;

fn var_key(tree: &Tree) -> Option<VarKey> {
    match tree {
        Tree::Identifier(ident) => Some(identifier_key(ident)),
        Tree::FieldAccess(access) => access
            .name
            .element
            .as_identifier()
            .and_then(|name| name.field_type)
            .map(VarKey::Typed),
        Tree::Parentheses(parens) => var_key(&parens.tree.element),
        _ => None,
    }
}

fn identifier_key(ident: &Identifier) -> VarKey {
    match ident.field_type {
        Some(id) => VarKey::Typed(id),
        None => VarKey::Named(ident.simple_name.clone()),
    }
}

/// Union `from` into `into`.
fn join(into: &mut Vars, from: Vars) {
    for (key, sources) in from {
        into.entry(key).or_default().extend(sources);
    }
}

/// The visitor behind [`LocalFlow::analyze`].
///
/// `value` holds the sources carried by the expression visited last; each
/// `visit_*` override leaves its own value there before `post_visit` checks
/// sources and sinks.
struct Analyzer<'s, S: ?Sized> {
    spec: &'s S,
    mode: FlowMode,
    root: NodeId,
    vars: Vars,
    value: Sources,
    paths: BTreeSet<FlowPath>,
    states: HashMap<NodeId, FlowState>,
}

impl<S: LocalFlowSpec + ?Sized> Analyzer<'_, S> {
    /// Visit `tree` and take its value.
    fn eval(&mut self, tree: &Tree, cursor: &mut Cursor) -> Sources {
        self.visit(tree.clone(), cursor, &mut ());
        std::mem::take(&mut self.value)
    }

    fn lookup(&self, key: &VarKey) -> Sources {
        self.vars.get(key).cloned().unwrap_or_default()
    }

    /// Fold in the sources of operands the caller declares as flowing into
    /// `to`.
    fn additional_steps(
        &self,
        operands: &[(&Tree, Sources)],
        to: &Tree,
        cursor: &Cursor,
        value: &mut Sources,
    ) {
        for (operand, sources) in operands {
            if !sources.is_empty() && self.spec.is_additional_flow_step(operand, to, cursor) {
                value.extend(sources.iter().copied());
            }
        }
    }

    /// Variables mentioned by a barrier guard condition.
    fn guarded_variables(&self, condition: &Tree, cursor: &Cursor) -> Vec<VarKey> {
        let inner = match condition {
            Tree::ControlParentheses(parens) => &parens.tree.element,
            other => other,
        };
        if !self.spec.is_barrier_guard(inner, cursor) {
            return Vec::new();
        }
        visitor::collect(inner, |tree, _| match tree {
            Tree::Identifier(_) | Tree::FieldAccess(_) => var_key(tree),
            _ => None,
        })
    }

    fn record(&mut self, id: NodeId, state: FlowState) {
        let entry = self.states.entry(id).or_default();
        *entry = (*entry).max(state);
    }
}

impl<S: LocalFlowSpec + ?Sized> TreeVisitor<()> for Analyzer<'_, S> {
    fn pre_visit(&mut self, _tree: &Tree, _cursor: &mut Cursor, _p: &mut ()) -> VisitResult {
        self.value.clear();
        VisitResult::Continue
    }

    fn post_visit(&mut self, tree: Tree, cursor: &mut Cursor, _p: &mut ()) -> Option<Tree> {
        let id = tree.id();
        if self.spec.is_source(&tree, cursor) {
            trace!(kind = ?tree.kind(), "flow source");
            self.value.insert(id);
        }
        if !self.value.is_empty() {
            if self.spec.is_sink(&tree, cursor) {
                trace!(kind = ?tree.kind(), sources = self.value.len(), "flow reached sink");
                for source in &self.value {
                    self.paths.insert(FlowPath {
                        source: *source,
                        sink: id,
                    });
                }
                self.record(id, FlowState::SinkHit);
            } else {
                self.record(id, FlowState::Tracked);
            }
        }

        // Parameters and initialized variables take their value once any
        // source on the declaration itself has been folded in.
        if let Tree::NamedVariable(variable) = &tree {
            if let Some(key) = var_key(&variable.name) {
                self.vars.insert(key, self.value.clone());
            }
        }
        Some(tree)
    }

    fn visit_class_declaration(
        &mut self,
        node: Arc<ClassDeclaration>,
        cursor: &mut Cursor,
        p: &mut (),
    ) -> Option<Tree> {
        if node.id != self.root {
            return Some(Tree::ClassDeclaration(node));
        }
        Some(Tree::ClassDeclaration(visitor::walk_class_declaration(
            self, node, cursor, p,
        )))
    }

    fn visit_method_declaration(
        &mut self,
        node: Arc<MethodDeclaration>,
        cursor: &mut Cursor,
        p: &mut (),
    ) -> Option<Tree> {
        // Methods of an analyzed class start from the class-level state.
        let saved = self.vars.clone();
        let node = visitor::walk_method_declaration(self, node, cursor, p);
        self.vars = saved;
        self.value.clear();
        Some(Tree::MethodDeclaration(node))
    }

    fn visit_block(&mut self, node: Arc<Block>, cursor: &mut Cursor, p: &mut ()) -> Option<Tree> {
        let node = visitor::walk_block(self, node, cursor, p);
        self.value.clear();
        Some(Tree::Block(node))
    }

    fn visit_named_variable(
        &mut self,
        node: Arc<NamedVariable>,
        cursor: &mut Cursor,
        _p: &mut (),
    ) -> Option<Tree> {
        self.value = match &node.initializer {
            Some(initializer) => self.eval(&initializer.element, cursor),
            None => Sources::new(),
        };
        Some(Tree::NamedVariable(node))
    }

    fn visit_identifier(
        &mut self,
        node: Arc<Identifier>,
        _cursor: &mut Cursor,
        _p: &mut (),
    ) -> Option<Tree> {
        self.value = self.lookup(&identifier_key(&node));
        Some(Tree::Identifier(node))
    }

    fn visit_field_access(
        &mut self,
        node: Arc<FieldAccess>,
        cursor: &mut Cursor,
        _p: &mut (),
    ) -> Option<Tree> {
        let _ = self.eval(&node.target, cursor);
        let tree = Tree::FieldAccess(node);
        self.value = var_key(&tree)
            .map(|key| self.lookup(&key))
            .unwrap_or_default();
        Some(tree)
    }

    fn visit_assignment(
        &mut self,
        node: Arc<Assignment>,
        cursor: &mut Cursor,
        _p: &mut (),
    ) -> Option<Tree> {
        let rhs = self.eval(&node.assignment, cursor);
        let key = var_key(&node.variable);
        let value = if node.operator.element.is_compound() {
            match self.mode {
                FlowMode::Taint => {
                    let mut value = key.as_ref().map(|k| self.lookup(k)).unwrap_or_default();
                    value.extend(rhs);
                    value
                }
                FlowMode::Data => Sources::new(),
            }
        } else {
            rhs
        };
        if let Some(key) = key {
            self.vars.insert(key, value.clone());
        }
        self.value = value;
        Some(Tree::Assignment(node))
    }

    fn visit_binary(
        &mut self,
        node: Arc<Binary>,
        cursor: &mut Cursor,
        _p: &mut (),
    ) -> Option<Tree> {
        let left = self.eval(&node.left, cursor);
        let right = self.eval(&node.right, cursor);
        let tree = Tree::Binary(Arc::clone(&node));
        let mut value = match self.mode {
            FlowMode::Taint => left.union(&right).copied().collect(),
            FlowMode::Data => Sources::new(),
        };
        self.additional_steps(
            &[(&node.left, left), (&node.right, right)],
            &tree,
            cursor,
            &mut value,
        );
        self.value = value;
        Some(tree)
    }

    fn visit_unary(
        &mut self,
        node: Arc<Unary>,
        cursor: &mut Cursor,
        _p: &mut (),
    ) -> Option<Tree> {
        let operand = self.eval(&node.expression, cursor);
        let mut value = match self.mode {
            FlowMode::Taint => operand.clone(),
            FlowMode::Data => Sources::new(),
        };
        if node.operator.element.is_modifying() && self.mode == FlowMode::Data {
            if let Some(key) = var_key(&node.expression) {
                self.vars.insert(key, Sources::new());
            }
        }
        let tree = Tree::Unary(Arc::clone(&node));
        self.additional_steps(&[(&node.expression, operand)], &tree, cursor, &mut value);
        self.value = value;
        Some(tree)
    }

    fn visit_ternary(
        &mut self,
        node: Arc<Ternary>,
        cursor: &mut Cursor,
        _p: &mut (),
    ) -> Option<Tree> {
        let _ = self.eval(&node.condition, cursor);
        let mut value = self.eval(&node.true_part.element, cursor);
        value.extend(self.eval(&node.false_part.element, cursor));
        self.value = value;
        Some(Tree::Ternary(node))
    }

    fn visit_method_invocation(
        &mut self,
        node: Arc<MethodInvocation>,
        cursor: &mut Cursor,
        _p: &mut (),
    ) -> Option<Tree> {
        let mut operands = Vec::new();
        if let Some(select) = &node.select {
            operands.push((&select.element, self.eval(&select.element, cursor)));
        }
        for argument in node.arguments.real_elements() {
            operands.push((argument, self.eval(argument, cursor)));
        }
        let tree = Tree::MethodInvocation(Arc::clone(&node));
        let mut value = Sources::new();
        self.additional_steps(&operands, &tree, cursor, &mut value);
        self.value = value;
        Some(tree)
    }

    fn visit_new_class(
        &mut self,
        node: Arc<NewClass>,
        cursor: &mut Cursor,
        _p: &mut (),
    ) -> Option<Tree> {
        let mut operands = Vec::new();
        for argument in node.arguments.real_elements() {
            operands.push((argument, self.eval(argument, cursor)));
        }
        let tree = Tree::NewClass(Arc::clone(&node));
        let mut value = Sources::new();
        self.additional_steps(&operands, &tree, cursor, &mut value);
        self.value = value;
        Some(tree)
    }

    fn visit_if(&mut self, node: Arc<If>, cursor: &mut Cursor, _p: &mut ()) -> Option<Tree> {
        let _ = self.eval(&node.condition, cursor);
        let guarded = self.guarded_variables(&node.condition, cursor);

        let before = self.vars.clone();
        for key in &guarded {
            self.vars.remove(key);
        }
        let _ = self.eval(&node.then_part.element, cursor);
        let after_then = std::mem::replace(&mut self.vars, before);

        if let Some(else_part) = &node.else_part {
            let _ = self.eval(else_part, cursor);
        }
        join(&mut self.vars, after_then);
        self.value.clear();
        Some(Tree::If(node))
    }

    fn visit_while_loop(
        &mut self,
        node: Arc<WhileLoop>,
        cursor: &mut Cursor,
        _p: &mut (),
    ) -> Option<Tree> {
        let mut entry = self.vars.clone();
        for pass in 1..=MAX_LOOP_PASSES {
            self.vars = entry.clone();
            let _ = self.eval(&node.condition, cursor);
            for key in self.guarded_variables(&node.condition, cursor) {
                self.vars.remove(&key);
            }
            let _ = self.eval(&node.body.element, cursor);

            let mut next = entry.clone();
            join(&mut next, std::mem::take(&mut self.vars));
            let stable = next == entry;
            entry = next;
            if stable {
                trace!(pass, "loop state stable");
                break;
            }
            if pass == MAX_LOOP_PASSES {
                debug!(passes = pass, "loop state did not settle");
            }
        }
        self.vars = entry;
        self.value.clear();
        Some(Tree::WhileLoop(node))
    }
}
