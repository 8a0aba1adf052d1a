// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Escape analysis for local variables.
//!
//! A local escapes its defining block when a reference to it is:
//!
//! - returned
//! - assigned to a variable that is not a local of the same or a nested
//!   block (a field, an array element, a local of an enclosing block)
//! - passed as an argument to a method or constructor
//!
//! A local is a variable owned by a method that is not one of that method's
//! parameters. Primitive locals never escape; only references have an
//! identity to leak. Parentheses and both branches of a ternary are looked
//! through, but a ternary is not itself an escape site.
//!
//! # Limitations
//!
//! Intraprocedural and unsound: a local stored in another local that later
//! escapes is not reported, and neither is a local captured by a lambda or
//! anonymous class. Locals are identified by their resolved variable type,
//! so unattributed code reports nothing.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use treewright_core::NodeId;
use treewright_lst::cursor::Cursor;
use treewright_lst::types::{TypeId, TypeTable};
use treewright_lst::visitor::{self, TreeVisitor, VisitResult};
use treewright_lst::{Block, Identifier, NamedVariable, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscapeKind {
    Return,
    NonLocalAssignment,
    Argument,
}

/// One leaking reference at one escape site.
#[derive(Debug, Clone)]
pub struct Escape {
    /// The `return`, assignment, method invocation or `new` expression.
    pub site: Tree,
    pub leaking: Arc<Identifier>,
    pub kind: EscapeKind,
}

pub struct EscapeAnalysis;

impl EscapeAnalysis {
    /// Every escape inside `scope`, in source order.
    pub fn find_escapes(scope: &Tree, types: &TypeTable) -> Vec<Escape> {
        let mut finder = EscapeFinder {
            types,
            blocks: Vec::new(),
            declared_in: HashMap::new(),
        };
        let mut escapes = Vec::new();
        finder.visit_root(scope.clone(), &mut escapes);
        debug!(
            scope = ?scope.kind(),
            escapes = escapes.len(),
            "escape analysis done"
        );
        escapes
    }

    /// The leaking identifiers of [`find_escapes`](Self::find_escapes).
    pub fn leaking_identifiers(scope: &Tree, types: &TypeTable) -> Vec<Arc<Identifier>> {
        Self::find_escapes(scope, types)
            .into_iter()
            .map(|escape| escape.leaking)
            .collect()
    }

    /// Whether `identifier` refers to a local of reference type.
    pub fn is_local_reference(identifier: &Identifier, types: &TypeTable) -> bool {
        let Some(variable) = identifier.field_type.and_then(|id| types.variable(id)) else {
            return false;
        };
        let Some(method) = variable.owner.and_then(|owner| types.method(owner)) else {
            return false;
        };
        if method.parameter_names.iter().any(|p| *p == variable.name) {
            return false;
        }
        !variable.ty.is_some_and(|ty| types.is_primitive(ty))
    }
}

struct EscapeFinder<'t> {
    types: &'t TypeTable,
    /// Ids of the blocks enclosing the current node, outermost first.
    blocks: Vec<NodeId>,
    /// Block path of each local's declaration.
    declared_in: HashMap<TypeId, Vec<NodeId>>,
}

impl EscapeFinder<'_> {
    /// Local references an expression evaluates to.
    fn references(&self, expression: &Tree) -> Vec<Arc<Identifier>> {
        match expression {
            Tree::Identifier(ident) if EscapeAnalysis::is_local_reference(ident, self.types) => {
                vec![Arc::clone(ident)]
            }
            Tree::Parentheses(parens) => self.references(&parens.tree.element),
            Tree::Ternary(ternary) => {
                let mut found = self.references(&ternary.true_part.element);
                found.extend(self.references(&ternary.false_part.element));
                found
            }
            _ => Vec::new(),
        }
    }

    fn block_path(&self, identifier: &Identifier) -> Option<&Vec<NodeId>> {
        identifier
            .field_type
            .and_then(|id| self.declared_in.get(&id))
    }

    /// Whether assigning `leaking` to `target` keeps it inside its block.
    fn stays_local(&self, target: &Tree, leaking: &Identifier) -> bool {
        let target = match target {
            Tree::Parentheses(parens) => &parens.tree.element,
            other => other,
        };
        let Some(target) = target.as_identifier() else {
            return false;
        };
        if !EscapeAnalysis::is_local_reference(target, self.types) {
            return false;
        }
        match (self.block_path(target), self.block_path(leaking)) {
            (Some(target_path), Some(leaking_path)) => target_path.starts_with(leaking_path),
            _ => false,
        }
    }

    fn report(
        escapes: &mut Vec<Escape>,
        site: &Tree,
        leaking: Vec<Arc<Identifier>>,
        kind: EscapeKind,
    ) {
        escapes.extend(leaking.into_iter().map(|leaking| Escape {
            site: site.clone(),
            leaking,
            kind,
        }));
    }
}

impl TreeVisitor<Vec<Escape>> for EscapeFinder<'_> {
    fn pre_visit(
        &mut self,
        tree: &Tree,
        _cursor: &mut Cursor,
        escapes: &mut Vec<Escape>,
    ) -> VisitResult {
        match tree {
            Tree::Return(ret) => {
                if let Some(expression) = &ret.expression {
                    let leaking = self.references(expression);
                    Self::report(escapes, tree, leaking, EscapeKind::Return);
                }
            }
            Tree::Assignment(assignment) => {
                let leaking = self
                    .references(&assignment.assignment)
                    .into_iter()
                    .filter(|ident| !self.stays_local(&assignment.variable, ident))
                    .collect();
                Self::report(escapes, tree, leaking, EscapeKind::NonLocalAssignment);
            }
            Tree::MethodInvocation(invocation) => {
                let leaking = invocation
                    .arguments
                    .real_elements()
                    .flat_map(|argument| self.references(argument))
                    .collect();
                Self::report(escapes, tree, leaking, EscapeKind::Argument);
            }
            Tree::NewClass(new_class) => {
                let leaking = new_class
                    .arguments
                    .real_elements()
                    .flat_map(|argument| self.references(argument))
                    .collect();
                Self::report(escapes, tree, leaking, EscapeKind::Argument);
            }
            _ => {}
        }
        VisitResult::Continue
    }

    fn visit_block(
        &mut self,
        node: Arc<Block>,
        cursor: &mut Cursor,
        escapes: &mut Vec<Escape>,
    ) -> Option<Tree> {
        self.blocks.push(node.id);
        let node = visitor::walk_block(self, node, cursor, escapes);
        self.blocks.pop();
        Some(Tree::Block(node))
    }

    fn visit_named_variable(
        &mut self,
        node: Arc<NamedVariable>,
        cursor: &mut Cursor,
        escapes: &mut Vec<Escape>,
    ) -> Option<Tree> {
        if let Some(variable) = node.variable_type {
            self.declared_in.insert(variable, self.blocks.clone());
        }
        Some(Tree::NamedVariable(visitor::walk_named_variable(
            self, node, cursor, escapes,
        )))
    }
}
