use std::sync::Arc;

use treewright_analysis::MethodMatcher;
use treewright_lst::visitor::{walk_method_declaration, walk_method_invocation, walk_new_class};
use treewright_lst::{
    Cursor, MethodDeclaration, MethodInvocation, NewClass, Tree, TreeKind, TreeVisitor,
};

use crate::context::ExecutionContext;
use crate::error::RecipeError;
use crate::recipe::{Recipe, RecipeVisitor};

/// Marks invocations, constructor calls and declarations of matching
/// methods.
#[derive(Debug)]
pub struct FindMethods {
    matcher: MethodMatcher,
}

impl FindMethods {
    pub fn new(pattern: &str, match_overrides: bool) -> Result<Self, RecipeError> {
        Ok(Self {
            matcher: MethodMatcher::new(pattern, match_overrides)?,
        })
    }
}

impl Recipe for FindMethods {
    fn name(&self) -> &str {
        "find-methods"
    }

    fn description(&self) -> &str {
        "Find method calls and declarations by signature pattern."
    }

    fn visitor(&self) -> RecipeVisitor<'_> {
        Box::new(MethodReferences {
            matcher: &self.matcher,
        })
    }
}

struct MethodReferences<'a> {
    matcher: &'a MethodMatcher,
}

impl TreeVisitor<ExecutionContext> for MethodReferences<'_> {
    fn visit_method_invocation(
        &mut self,
        node: Arc<MethodInvocation>,
        cursor: &mut Cursor,
        ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        let matched = cursor
            .types()
            .is_some_and(|types| self.matcher.matches_invocation(&node, types));
        let tree = Tree::MethodInvocation(walk_method_invocation(self, node, cursor, ctx));
        Some(if matched {
            tree.with_search_result(None)
        } else {
            tree
        })
    }

    fn visit_new_class(
        &mut self,
        node: Arc<NewClass>,
        cursor: &mut Cursor,
        ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        let matched = cursor
            .types()
            .is_some_and(|types| self.matcher.matches_new_class(&node, types));
        let tree = Tree::NewClass(walk_new_class(self, node, cursor, ctx));
        Some(if matched {
            tree.with_search_result(None)
        } else {
            tree
        })
    }

    fn visit_method_declaration(
        &mut self,
        node: Arc<MethodDeclaration>,
        cursor: &mut Cursor,
        ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        let enclosing = cursor
            .first_enclosing(TreeKind::ClassDeclaration)
            .and_then(Tree::as_class_declaration);
        let matched = match (enclosing, cursor.types()) {
            (Some(class), Some(types)) => self.matcher.matches_declaration(&node, class, types),
            (None, Some(types)) => node
                .method_type
                .is_some_and(|m| self.matcher.matches_method_type(types, m)),
            _ => false,
        };
        let tree = Tree::MethodDeclaration(walk_method_declaration(self, node, cursor, ctx));
        Some(if matched {
            tree.with_search_result(None)
        } else {
            tree
        })
    }
}
