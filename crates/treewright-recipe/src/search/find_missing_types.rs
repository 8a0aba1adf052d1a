use std::sync::Arc;

use tracing::debug;
use treewright_core::{Marker, MarkerKind};
use treewright_lst::visitor::VisitResult;
use treewright_lst::{CompilationUnit, Cursor, Tree, TreeKind, TreeVisitor, TypeTable};

use crate::context::ExecutionContext;
use crate::recipe::{Recipe, RecipeVisitor};

/// Marks nodes that lack the type attribution passes rely on.
///
/// Each finding is a [`Marker::MissingType`] describing what is absent.
/// The bodies of anonymous classes are not checked.
#[derive(Debug, Default)]
pub struct FindMissingTypes;

impl FindMissingTypes {
    /// Every node in `unit` with a missing type, paired with the finding.
    pub fn find(unit: &Arc<CompilationUnit>) -> Vec<(Tree, String)> {
        let mut ctx = ExecutionContext::default();
        let Some(marked) = MissingTypes.visit_root(Tree::CompilationUnit(unit.clone()), &mut ctx)
        else {
            return Vec::new();
        };
        treewright_lst::visitor::collect(&marked, |tree, _| {
            tree.markers()
                .find(MarkerKind::MissingType)
                .and_then(Marker::description)
                .map(|d| (tree.clone(), d.to_string()))
        })
    }
}

impl Recipe for FindMissingTypes {
    fn name(&self) -> &str {
        "find-missing-types"
    }

    fn description(&self) -> &str {
        "Report calls, declarations and variables without type attribution."
    }

    fn visitor(&self) -> RecipeVisitor<'_> {
        Box::new(MissingTypes)
    }
}

struct MissingTypes;

impl MissingTypes {
    fn finding(tree: &Tree, types: &TypeTable) -> Option<&'static str> {
        match tree {
            Tree::MethodInvocation(n) if n.method_type.is_none() => {
                Some("method invocation has no method type")
            }
            Tree::NewClass(n) if n.constructor_type.is_none() => {
                Some("constructor call has no constructor type")
            }
            Tree::ClassDeclaration(n) if n.class_type.is_none() => {
                Some("class declaration has no class type")
            }
            Tree::MethodDeclaration(n) if n.method_type.is_none() => {
                Some("method declaration has no method type")
            }
            Tree::NamedVariable(n) => match n.variable_type {
                None => Some("variable has no variable type"),
                Some(handle) if types.variable(handle).and_then(|v| v.ty).is_none() => {
                    Some("variable type is unresolved")
                }
                Some(_) => None,
            },
            _ => None,
        }
    }
}

impl TreeVisitor<ExecutionContext> for MissingTypes {
    fn pre_visit(
        &mut self,
        tree: &Tree,
        cursor: &mut Cursor,
        _ctx: &mut ExecutionContext,
    ) -> VisitResult {
        let in_anonymous_body = tree.kind() == TreeKind::Block
            && cursor
                .parent()
                .is_some_and(|p| p.kind() == TreeKind::NewClass);
        if in_anonymous_body {
            VisitResult::SkipChildren
        } else {
            VisitResult::Continue
        }
    }

    fn post_visit(
        &mut self,
        tree: Tree,
        cursor: &mut Cursor,
        _ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        let Some(types) = cursor.types() else {
            return Some(tree);
        };
        let Some(description) = Self::finding(&tree, types) else {
            return Some(tree);
        };
        debug!(kind = ?tree.kind(), id = ?tree.id(), description, "missing type");
        let markers = tree
            .markers()
            .add_if_absent(Marker::missing_type(description));
        Some(tree.with_markers(markers))
    }
}
