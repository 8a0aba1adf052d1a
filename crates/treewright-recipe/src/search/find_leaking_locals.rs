use std::collections::HashMap;
use std::sync::Arc;

use treewright_analysis::{EscapeAnalysis, EscapeKind};
use treewright_core::NodeId;
use treewright_lst::visitor::walk_method_declaration;
use treewright_lst::{Cursor, Identifier, MethodDeclaration, Tree, TreeVisitor};

use crate::context::ExecutionContext;
use crate::recipe::{Recipe, RecipeVisitor};

/// Marks references through which a local variable escapes its method:
/// returned, assigned to a field or an enclosing local, or passed as an
/// argument. The search result says which.
#[derive(Debug, Default)]
pub struct FindLeakingLocals;

impl Recipe for FindLeakingLocals {
    fn name(&self) -> &str {
        "find-leaking-locals"
    }

    fn description(&self) -> &str {
        "Find local variables that escape the block declaring them."
    }

    fn visitor(&self) -> RecipeVisitor<'_> {
        Box::new(LeakingLocals::default())
    }
}

fn describe(kind: EscapeKind) -> &'static str {
    match kind {
        EscapeKind::Return => "returned",
        EscapeKind::NonLocalAssignment => "assigned to a non-local",
        EscapeKind::Argument => "passed as an argument",
    }
}

#[derive(Default)]
struct LeakingLocals {
    leaks: HashMap<NodeId, &'static str>,
}

impl TreeVisitor<ExecutionContext> for LeakingLocals {
    fn visit_method_declaration(
        &mut self,
        node: Arc<MethodDeclaration>,
        cursor: &mut Cursor,
        ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        if let Some(types) = cursor.types() {
            let scope = Tree::MethodDeclaration(Arc::clone(&node));
            for escape in EscapeAnalysis::find_escapes(&scope, types) {
                self.leaks.insert(escape.leaking.id, describe(escape.kind));
            }
        }
        Some(Tree::MethodDeclaration(walk_method_declaration(
            self, node, cursor, ctx,
        )))
    }

    fn visit_identifier(
        &mut self,
        node: Arc<Identifier>,
        _cursor: &mut Cursor,
        _ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        let description = self.leaks.get(&node.id).copied();
        let tree = Tree::Identifier(node);
        Some(match description {
            Some(d) => tree.with_search_result(Some(d.to_string())),
            None => tree,
        })
    }
}
