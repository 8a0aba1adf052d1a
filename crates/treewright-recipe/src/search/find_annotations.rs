use std::sync::Arc;

use treewright_analysis::AnnotationMatcher;
use treewright_lst::visitor::walk_annotation;
use treewright_lst::{Annotation, Cursor, Tree, TreeVisitor};

use crate::context::ExecutionContext;
use crate::error::RecipeError;
use crate::recipe::{Recipe, RecipeVisitor};

/// Marks annotations matching an `@Type(args)` pattern.
#[derive(Debug)]
pub struct FindAnnotations {
    matcher: AnnotationMatcher,
}

impl FindAnnotations {
    pub fn new(pattern: &str) -> Result<Self, RecipeError> {
        Ok(Self {
            matcher: AnnotationMatcher::new(pattern)?,
        })
    }
}

impl Recipe for FindAnnotations {
    fn name(&self) -> &str {
        "find-annotations"
    }

    fn description(&self) -> &str {
        "Find annotations by type and arguments."
    }

    fn visitor(&self) -> RecipeVisitor<'_> {
        Box::new(Annotations {
            matcher: &self.matcher,
        })
    }
}

struct Annotations<'a> {
    matcher: &'a AnnotationMatcher,
}

impl TreeVisitor<ExecutionContext> for Annotations<'_> {
    fn visit_annotation(
        &mut self,
        node: Arc<Annotation>,
        cursor: &mut Cursor,
        ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        let matched = cursor
            .types()
            .is_some_and(|types| self.matcher.matches_annotation(&node, types));
        let tree = Tree::Annotation(walk_annotation(self, node, cursor, ctx));
        Some(if matched {
            tree.with_search_result(None)
        } else {
            tree
        })
    }
}
