// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Dispatch and walk functions for tree traversal.
//!
//! [`visit_tree`] is the engine behind [`TreeVisitor::visit`]: it maintains
//! the cursor and calls the visitor's hooks. The `walk_*` functions visit a
//! node's children in source order and rebuild the node through its
//! copy-on-write `with_*` methods, so a node whose children all come back
//! unchanged is returned as the same allocation.

use std::sync::Arc;

use tracing::debug;

use super::traits::{TreeVisitor, VisitResult};
use crate::cursor::Cursor;
use crate::padding::{Container, LeftPadded, RightPadded};
use crate::tree::*;

/// Visit `tree`: push a cursor frame, call `pre_visit`, the per-variant
/// method and `post_visit`, then pop the frame.
pub fn visit_tree<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    tree: Tree,
    cursor: &mut Cursor,
    p: &mut P,
) -> Option<Tree> {
    if cursor.is_stopped() {
        return Some(tree);
    }
    if let Tree::CompilationUnit(unit) = &tree {
        cursor.set_types(Arc::clone(&unit.types));
    }

    cursor.push(tree.clone());
    let result = match v.pre_visit(&tree, cursor, p) {
        VisitResult::Stop => {
            cursor.stop();
            Some(tree)
        }
        VisitResult::SkipChildren => v.post_visit(tree, cursor, p),
        VisitResult::Continue => match visit_variant(v, tree, cursor, p) {
            Some(visited) if !cursor.is_stopped() => v.post_visit(visited, cursor, p),
            other => other,
        },
    };
    cursor.pop();
    result
}

macro_rules! dispatch_variants {
    ($($snake:ident : $variant:ident),* $(,)?) => {
        paste::paste! {
            fn visit_variant<P, V: TreeVisitor<P> + ?Sized>(
                v: &mut V,
                tree: Tree,
                cursor: &mut Cursor,
                p: &mut P,
            ) -> Option<Tree> {
                match tree {
                    $(Tree::$variant(node) => v.[<visit_ $snake>](node, cursor, p),)*
                }
            }
        }
    };
}

for_each_variant!(dispatch_variants);

// ============================================================================
// Child helpers
// ============================================================================

/// Visit a child that cannot be removed. A deletion is ignored.
pub fn visit_required<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    tree: &Tree,
    cursor: &mut Cursor,
    p: &mut P,
) -> Tree {
    match v.visit(tree.clone(), cursor, p) {
        Some(visited) => visited,
        None => {
            debug!(kind = ?tree.kind(), "ignoring deletion of a required child");
            tree.clone()
        }
    }
}

pub fn visit_optional<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    tree: &Option<Tree>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Option<Tree> {
    tree.as_ref().and_then(|t| v.visit(t.clone(), cursor, p))
}

pub fn visit_list<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    trees: &[Tree],
    cursor: &mut Cursor,
    p: &mut P,
) -> Vec<Tree> {
    trees
        .iter()
        .filter_map(|t| v.visit(t.clone(), cursor, p))
        .collect()
}

pub fn visit_right_padded<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    rp: &RightPadded<Tree>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Option<RightPadded<Tree>> {
    v.visit(rp.element.clone(), cursor, p)
        .map(|element| rp.clone().with_element(element))
}

pub fn visit_required_right_padded<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    rp: &RightPadded<Tree>,
    cursor: &mut Cursor,
    p: &mut P,
) -> RightPadded<Tree> {
    let element = visit_required(v, &rp.element, cursor, p);
    rp.clone().with_element(element)
}

pub fn visit_right_padded_list<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    list: &[RightPadded<Tree>],
    cursor: &mut Cursor,
    p: &mut P,
) -> Vec<RightPadded<Tree>> {
    list.iter()
        .filter_map(|rp| visit_right_padded(v, rp, cursor, p))
        .collect()
}

pub fn visit_left_padded<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    lp: &LeftPadded<Tree>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Option<LeftPadded<Tree>> {
    v.visit(lp.element.clone(), cursor, p)
        .map(|element| lp.clone().with_element(element))
}

pub fn visit_required_left_padded<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    lp: &LeftPadded<Tree>,
    cursor: &mut Cursor,
    p: &mut P,
) -> LeftPadded<Tree> {
    let element = visit_required(v, &lp.element, cursor, p);
    lp.clone().with_element(element)
}

pub fn visit_container<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    container: &Container<Tree>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Container<Tree> {
    let elements = visit_right_padded_list(v, &container.elements, cursor, p);
    container.clone().with_padded_elements(elements)
}

pub fn visit_optional_container<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    container: &Option<Container<Tree>>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Option<Container<Tree>> {
    container
        .as_ref()
        .map(|c| visit_container(v, c, cursor, p))
}

// ============================================================================
// Declarations
// ============================================================================

pub fn walk_compilation_unit<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<CompilationUnit>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<CompilationUnit> {
    let package = node
        .package
        .as_ref()
        .and_then(|rp| visit_right_padded(v, rp, cursor, p));
    let imports = visit_right_padded_list(v, &node.imports, cursor, p);
    let classes = visit_list(v, &node.classes, cursor, p);
    node.with_package(package)
        .with_imports(imports)
        .with_classes(classes)
}

pub fn walk_package<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<Package>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<Package> {
    let expression = visit_required(v, &node.expression, cursor, p);
    node.with_expression(expression)
}

pub fn walk_import<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<Import>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<Import> {
    let qualid = visit_required(v, &node.qualid, cursor, p);
    node.with_qualid(qualid)
}

pub fn walk_class_declaration<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<ClassDeclaration>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<ClassDeclaration> {
    let leading_annotations = visit_list(v, &node.leading_annotations, cursor, p);
    let modifiers = visit_list(v, &node.modifiers, cursor, p);
    let name = visit_required(v, &node.name, cursor, p);
    let type_parameters = visit_optional_container(v, &node.type_parameters, cursor, p);
    let extends = node
        .extends
        .as_ref()
        .and_then(|lp| visit_left_padded(v, lp, cursor, p));
    let implements = visit_optional_container(v, &node.implements, cursor, p);
    let body = visit_required(v, &node.body, cursor, p);
    node.with_leading_annotations(leading_annotations)
        .with_modifiers(modifiers)
        .with_name(name)
        .with_type_parameters(type_parameters)
        .with_extends(extends)
        .with_implements(implements)
        .with_body(body)
}

pub fn walk_method_declaration<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<MethodDeclaration>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<MethodDeclaration> {
    let leading_annotations = visit_list(v, &node.leading_annotations, cursor, p);
    let modifiers = visit_list(v, &node.modifiers, cursor, p);
    let type_parameters = visit_optional_container(v, &node.type_parameters, cursor, p);
    let return_type = visit_optional(v, &node.return_type, cursor, p);
    let name = visit_required(v, &node.name, cursor, p);
    let parameters = visit_container(v, &node.parameters, cursor, p);
    let throws = visit_optional_container(v, &node.throws, cursor, p);
    let body = visit_optional(v, &node.body, cursor, p);
    node.with_leading_annotations(leading_annotations)
        .with_modifiers(modifiers)
        .with_type_parameters(type_parameters)
        .with_return_type(return_type)
        .with_name(name)
        .with_parameters(parameters)
        .with_throws(throws)
        .with_body(body)
}

pub fn walk_variable_declarations<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<VariableDeclarations>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<VariableDeclarations> {
    let leading_annotations = visit_list(v, &node.leading_annotations, cursor, p);
    let modifiers = visit_list(v, &node.modifiers, cursor, p);
    let type_expression = visit_optional(v, &node.type_expression, cursor, p);
    let variables = visit_right_padded_list(v, &node.variables, cursor, p);
    node.with_leading_annotations(leading_annotations)
        .with_modifiers(modifiers)
        .with_type_expression(type_expression)
        .with_variables(variables)
}

pub fn walk_named_variable<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<NamedVariable>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<NamedVariable> {
    let name = visit_required(v, &node.name, cursor, p);
    let initializer = node
        .initializer
        .as_ref()
        .and_then(|lp| visit_left_padded(v, lp, cursor, p));
    node.with_name(name).with_initializer(initializer)
}

pub fn walk_annotation<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<Annotation>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<Annotation> {
    let annotation_type = visit_required(v, &node.annotation_type, cursor, p);
    let arguments = visit_optional_container(v, &node.arguments, cursor, p);
    node.with_annotation_type(annotation_type)
        .with_arguments(arguments)
}

pub fn walk_modifier<P, V: TreeVisitor<P> + ?Sized>(
    _v: &mut V,
    node: Arc<Modifier>,
    _cursor: &mut Cursor,
    _p: &mut P,
) -> Arc<Modifier> {
    node
}

pub fn walk_type_parameter<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<TypeParameter>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<TypeParameter> {
    let name = visit_required(v, &node.name, cursor, p);
    let bounds = visit_optional_container(v, &node.bounds, cursor, p);
    node.with_name(name).with_bounds(bounds)
}

// ============================================================================
// Statements
// ============================================================================

pub fn walk_block<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<Block>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<Block> {
    let statements = visit_right_padded_list(v, &node.statements, cursor, p);
    node.with_statements(statements)
}

pub fn walk_return<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<Return>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<Return> {
    let expression = visit_optional(v, &node.expression, cursor, p);
    node.with_expression(expression)
}

pub fn walk_if<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<If>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<If> {
    let condition = visit_required(v, &node.condition, cursor, p);
    let then_part = visit_required_right_padded(v, &node.then_part, cursor, p);
    let else_part = visit_optional(v, &node.else_part, cursor, p);
    node.with_condition(condition)
        .with_then_part(then_part)
        .with_else_part(else_part)
}

pub fn walk_else<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<Else>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<Else> {
    let body = visit_required_right_padded(v, &node.body, cursor, p);
    node.with_body(body)
}

pub fn walk_while_loop<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<WhileLoop>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<WhileLoop> {
    let condition = visit_required(v, &node.condition, cursor, p);
    let body = visit_required_right_padded(v, &node.body, cursor, p);
    node.with_condition(condition).with_body(body)
}

pub fn walk_throw<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<Throw>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<Throw> {
    let exception = visit_required(v, &node.exception, cursor, p);
    node.with_exception(exception)
}

pub fn walk_empty<P, V: TreeVisitor<P> + ?Sized>(
    _v: &mut V,
    node: Arc<Empty>,
    _cursor: &mut Cursor,
    _p: &mut P,
) -> Arc<Empty> {
    node
}

pub fn walk_erroneous<P, V: TreeVisitor<P> + ?Sized>(
    _v: &mut V,
    node: Arc<Erroneous>,
    _cursor: &mut Cursor,
    _p: &mut P,
) -> Arc<Erroneous> {
    node
}

// ============================================================================
// Expressions
// ============================================================================

pub fn walk_control_parentheses<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<ControlParentheses>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<ControlParentheses> {
    let tree = visit_required_right_padded(v, &node.tree, cursor, p);
    node.with_tree(tree)
}

pub fn walk_parentheses<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<Parentheses>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<Parentheses> {
    let tree = visit_required_right_padded(v, &node.tree, cursor, p);
    node.with_tree(tree)
}

pub fn walk_identifier<P, V: TreeVisitor<P> + ?Sized>(
    _v: &mut V,
    node: Arc<Identifier>,
    _cursor: &mut Cursor,
    _p: &mut P,
) -> Arc<Identifier> {
    node
}

pub fn walk_field_access<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<FieldAccess>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<FieldAccess> {
    let target = visit_required(v, &node.target, cursor, p);
    let name = visit_required_left_padded(v, &node.name, cursor, p);
    node.with_target(target).with_name(name)
}

pub fn walk_array_access<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<ArrayAccess>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<ArrayAccess> {
    let indexed = visit_required(v, &node.indexed, cursor, p);
    let index = visit_required_left_padded(v, &node.index, cursor, p);
    node.with_indexed(indexed).with_index(index)
}

pub fn walk_literal<P, V: TreeVisitor<P> + ?Sized>(
    _v: &mut V,
    node: Arc<Literal>,
    _cursor: &mut Cursor,
    _p: &mut P,
) -> Arc<Literal> {
    node
}

pub fn walk_method_invocation<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<MethodInvocation>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<MethodInvocation> {
    let select = node
        .select
        .as_ref()
        .and_then(|rp| visit_right_padded(v, rp, cursor, p));
    let name = visit_required(v, &node.name, cursor, p);
    let arguments = visit_container(v, &node.arguments, cursor, p);
    node.with_select(select)
        .with_name(name)
        .with_arguments(arguments)
}

pub fn walk_new_class<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<NewClass>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<NewClass> {
    let clazz = visit_required(v, &node.clazz, cursor, p);
    let arguments = visit_container(v, &node.arguments, cursor, p);
    let body = visit_optional(v, &node.body, cursor, p);
    node.with_clazz(clazz)
        .with_arguments(arguments)
        .with_body(body)
}

pub fn walk_binary<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<Binary>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<Binary> {
    let left = visit_required(v, &node.left, cursor, p);
    let right = visit_required(v, &node.right, cursor, p);
    node.with_left(left).with_right(right)
}

pub fn walk_unary<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<Unary>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<Unary> {
    let expression = visit_required(v, &node.expression, cursor, p);
    node.with_expression(expression)
}

pub fn walk_assignment<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<Assignment>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<Assignment> {
    let variable = visit_required(v, &node.variable, cursor, p);
    let assignment = visit_required(v, &node.assignment, cursor, p);
    node.with_variable(variable).with_assignment(assignment)
}

pub fn walk_ternary<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<Ternary>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<Ternary> {
    let condition = visit_required(v, &node.condition, cursor, p);
    let true_part = visit_required_left_padded(v, &node.true_part, cursor, p);
    let false_part = visit_required_left_padded(v, &node.false_part, cursor, p);
    node.with_condition(condition)
        .with_true_part(true_part)
        .with_false_part(false_part)
}

// ============================================================================
// Types
// ============================================================================

pub fn walk_primitive<P, V: TreeVisitor<P> + ?Sized>(
    _v: &mut V,
    node: Arc<Primitive>,
    _cursor: &mut Cursor,
    _p: &mut P,
) -> Arc<Primitive> {
    node
}

pub fn walk_parameterized_type<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<ParameterizedType>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<ParameterizedType> {
    let clazz = visit_required(v, &node.clazz, cursor, p);
    let type_parameters = visit_optional_container(v, &node.type_parameters, cursor, p);
    node.with_clazz(clazz).with_type_parameters(type_parameters)
}

pub fn walk_array_type<P, V: TreeVisitor<P> + ?Sized>(
    v: &mut V,
    node: Arc<ArrayType>,
    cursor: &mut Cursor,
    p: &mut P,
) -> Arc<ArrayType> {
    let element_type = visit_required(v, &node.element_type, cursor, p);
    node.with_element_type(element_type)
}
