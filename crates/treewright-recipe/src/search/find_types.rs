use std::sync::Arc;

use treewright_analysis::TypeMatcher;
use treewright_lst::types::class_name;
use treewright_lst::visitor::{walk_compilation_unit, walk_field_access, VisitResult};
use treewright_lst::{
    CompilationUnit, Cursor, FieldAccess, Identifier, Tree, TreeKind, TreeVisitor, TypeId,
    TypeTable,
};

use crate::context::ExecutionContext;
use crate::error::RecipeError;
use crate::recipe::{Recipe, RecipeVisitor};

/// Marks every reference to a matching type: declared types of fields,
/// locals and parameters, type arguments, `new` targets, supertypes and
/// qualified names. Imports and the package declaration are left alone.
#[derive(Debug)]
pub struct FindTypes {
    matcher: TypeMatcher,
}

impl FindTypes {
    pub fn new(pattern: &str, include_subtypes: bool) -> Result<Self, RecipeError> {
        Ok(Self {
            matcher: TypeMatcher::new(pattern, include_subtypes)?,
        })
    }
}

impl Recipe for FindTypes {
    fn name(&self) -> &str {
        "find-types"
    }

    fn description(&self) -> &str {
        "Find type references by name."
    }

    fn visitor(&self) -> RecipeVisitor<'_> {
        Box::new(TypeReferences {
            matcher: &self.matcher,
        })
    }
}

struct TypeReferences<'a> {
    matcher: &'a TypeMatcher,
}

impl TypeReferences<'_> {
    /// Whether a name node refers to a matching type by that type's name,
    /// as opposed to a variable whose value has the type.
    fn names_matching_type(&self, name: &str, ty: Option<TypeId>, types: &TypeTable) -> bool {
        let Some(ty) = ty else {
            return false;
        };
        let Some(class) = types.class(ty) else {
            return false;
        };
        let simple = class_name(&class.fqn);
        let last = simple.rsplit('.').next().unwrap_or(&simple);
        last == name && self.matcher.matches_type(types, ty)
    }
}

impl TreeVisitor<ExecutionContext> for TypeReferences<'_> {
    fn pre_visit(
        &mut self,
        tree: &Tree,
        _cursor: &mut Cursor,
        _ctx: &mut ExecutionContext,
    ) -> VisitResult {
        match tree.kind() {
            TreeKind::Package | TreeKind::Import => VisitResult::SkipChildren,
            _ => VisitResult::Continue,
        }
    }

    fn visit_compilation_unit(
        &mut self,
        node: Arc<CompilationUnit>,
        cursor: &mut Cursor,
        ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        let types = Arc::clone(&node.types);
        let in_use = node.types_in_use();
        if !in_use.iter().any(|&id| self.matcher.matches_type(&types, id)) {
            return Some(Tree::CompilationUnit(node));
        }
        Some(Tree::CompilationUnit(walk_compilation_unit(
            self, node, cursor, ctx,
        )))
    }

    fn visit_identifier(
        &mut self,
        node: Arc<Identifier>,
        cursor: &mut Cursor,
        _ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        let matched = node.field_type.is_none()
            && cursor
                .types()
                .is_some_and(|types| self.names_matching_type(&node.simple_name, node.type_, types));
        let tree = Tree::Identifier(node);
        Some(if matched {
            tree.with_search_result(None)
        } else {
            tree
        })
    }

    fn visit_field_access(
        &mut self,
        node: Arc<FieldAccess>,
        cursor: &mut Cursor,
        ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        let matched = node.name.element.simple_name().is_some_and(|name| {
            cursor
                .types()
                .is_some_and(|types| self.names_matching_type(name, node.type_, types))
        });
        // A qualified type name is marked as a whole.
        if matched {
            return Some(Tree::FieldAccess(node).with_search_result(None));
        }
        Some(Tree::FieldAccess(walk_field_access(self, node, cursor, ctx)))
    }
}
