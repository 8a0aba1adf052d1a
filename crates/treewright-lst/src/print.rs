// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The printer.
//!
//! Every node implements [`Codegen`], appending its source text to a
//! [`CodegenState`]. A node prints its prefix, then its markers (depending on
//! [`PrintOptions`]), then its own tokens interleaved with its children and
//! their padding. Printing a parsed tree with no markers reproduces the
//! source byte for byte.
//!
//! Search-result markers print as a block comment in front of the marked
//! node: `/*~~>*/` or `/*~~(description)~~>*/`. Use
//! [`MarkerPrinting::Sanitized`] to print the source without them.

use std::sync::Arc;

use treewright_core::{Marker, MarkerPrinting, Markers};

use crate::padding::{Container, RightPadded};
use crate::space::Space;
use crate::tree::*;
use crate::types::ClassKind;

/// How a tree is printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintOptions {
    pub marker_printing: MarkerPrinting,
}

impl PrintOptions {
    pub fn sanitized() -> Self {
        Self {
            marker_printing: MarkerPrinting::Sanitized,
        }
    }

    pub fn verbose() -> Self {
        Self {
            marker_printing: MarkerPrinting::Verbose,
        }
    }
}

/// Accumulates printed output.
#[derive(Debug, Default)]
pub struct CodegenState {
    pub tokens: String,
    options: PrintOptions,
}

impl CodegenState {
    pub fn new(options: PrintOptions) -> Self {
        Self {
            tokens: String::new(),
            options,
        }
    }

    pub fn add_token(&mut self, token: &str) {
        self.tokens.push_str(token);
    }

    pub fn add_space(&mut self, space: &Space) {
        space.write_to(&mut self.tokens);
    }

    /// Print a node's markers according to the marker printing mode.
    pub fn add_markers(&mut self, markers: &Markers) {
        let mode = self.options.marker_printing;
        if mode == MarkerPrinting::Sanitized {
            return;
        }
        for marker in markers.iter() {
            match marker {
                Marker::SearchResult { description, .. } => match description {
                    Some(d) => {
                        self.tokens.push_str("/*~~(");
                        self.tokens.push_str(d);
                        self.tokens.push_str(")~~>*/");
                    }
                    None => self.tokens.push_str("/*~~>*/"),
                },
                Marker::MissingType { description, .. } if mode == MarkerPrinting::Verbose => {
                    self.tokens
                        .push_str(&format!("/*~~(missing type: {})~~>*/", description));
                }
                Marker::ParseExceptionResult { message, .. }
                    if mode == MarkerPrinting::Verbose =>
                {
                    self.tokens
                        .push_str(&format!("/*~~(parse error: {})~~>*/", message));
                }
                _ => {}
            }
        }
    }

    /// Print a node's prefix followed by its markers.
    pub fn add_prefix(&mut self, prefix: &Space, markers: &Markers) {
        self.add_space(prefix);
        self.add_markers(markers);
    }

    /// `before open elem after sep elem after ... close`.
    fn add_container(&mut self, container: &Container<Tree>, open: &str, sep: &str, close: &str) {
        self.add_space(&container.before);
        self.add_token(open);
        for (i, rp) in container.elements.iter().enumerate() {
            if i > 0 {
                self.add_token(sep);
            }
            rp.element.codegen(self);
            self.add_space(&rp.after);
        }
        self.add_token(close);
    }

    /// A statement in a block or control-statement body, with its `;`.
    fn add_statement(&mut self, rp: &RightPadded<Tree>) {
        rp.element.codegen(self);
        self.add_space(&rp.after);
        if rp.element.needs_semicolon() {
            self.add_token(";");
        }
    }

    fn add_all(&mut self, trees: &[Tree]) {
        for tree in trees {
            tree.codegen(self);
        }
    }
}

/// Something that prints as source text.
pub trait Codegen {
    fn codegen(&self, state: &mut CodegenState);

    /// Print with default options (search results visible).
    fn print(&self) -> String {
        self.print_with(&PrintOptions::default())
    }

    fn print_with(&self, options: &PrintOptions) -> String {
        let mut state = CodegenState::new(options.clone());
        self.codegen(&mut state);
        state.tokens
    }

    /// Print with surrounding blank space and common indentation removed,
    /// for showing a subtree on its own.
    fn print_trimmed(&self) -> String {
        trim_indent(&self.print())
    }
}

impl<T: Codegen + ?Sized> Codegen for Arc<T> {
    fn codegen(&self, state: &mut CodegenState) {
        (**self).codegen(state)
    }
}

macro_rules! tree_codegen {
    ($($snake:ident : $variant:ident),* $(,)?) => {
        impl Codegen for Tree {
            fn codegen(&self, state: &mut CodegenState) {
                match self {
                    $(Tree::$variant(n) => n.codegen(state),)*
                }
            }
        }
    };
}

for_each_variant!(tree_codegen);

/// Remove leading and trailing blank lines and the indentation common to all
/// non-blank lines.
pub fn trim_indent(text: &str) -> String {
    let trimmed = text.trim_matches(|c| c == '\n' || c == '\r');
    let lines: Vec<&str> = trimmed.lines().collect();
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| if l.len() >= indent { &l[indent..] } else { l.trim_start() })
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

// ============================================================================
// Declarations
// ============================================================================

impl Codegen for CompilationUnit {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        if let Some(package) = &self.package {
            package.element.codegen(state);
            state.add_space(&package.after);
            state.add_token(";");
        }
        for import in &self.imports {
            import.element.codegen(state);
            state.add_space(&import.after);
            state.add_token(";");
        }
        state.add_all(&self.classes);
        state.add_space(&self.eof);
    }
}

impl Codegen for Package {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token("package");
        self.expression.codegen(state);
    }
}

impl Codegen for Import {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token("import");
        if self.is_static.element {
            state.add_space(&self.is_static.before);
            state.add_token("static");
        }
        self.qualid.codegen(state);
    }
}

impl Codegen for ClassDeclaration {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_all(&self.leading_annotations);
        state.add_all(&self.modifiers);
        state.add_space(&self.kind.before);
        state.add_token(self.kind.element.keyword());
        self.name.codegen(state);
        if let Some(params) = &self.type_parameters {
            state.add_container(params, "<", ",", ">");
        }
        if let Some(extends) = &self.extends {
            state.add_space(&extends.before);
            state.add_token("extends");
            extends.element.codegen(state);
        }
        if let Some(implements) = &self.implements {
            let keyword = if self.kind.element == ClassKind::Interface {
                "extends"
            } else {
                "implements"
            };
            state.add_container(implements, keyword, ",", "");
        }
        self.body.codegen(state);
    }
}

impl Codegen for MethodDeclaration {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_all(&self.leading_annotations);
        state.add_all(&self.modifiers);
        if let Some(params) = &self.type_parameters {
            state.add_container(params, "<", ",", ">");
        }
        if let Some(return_type) = &self.return_type {
            return_type.codegen(state);
        }
        self.name.codegen(state);
        state.add_container(&self.parameters, "(", ",", ")");
        if let Some(throws) = &self.throws {
            state.add_container(throws, "throws", ",", "");
        }
        if let Some(body) = &self.body {
            body.codegen(state);
        }
    }
}

impl Codegen for VariableDeclarations {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_all(&self.leading_annotations);
        state.add_all(&self.modifiers);
        if let Some(type_expression) = &self.type_expression {
            type_expression.codegen(state);
        }
        if let Some(varargs) = &self.varargs {
            state.add_space(varargs);
            state.add_token("...");
        }
        for (i, variable) in self.variables.iter().enumerate() {
            if i > 0 {
                state.add_token(",");
            }
            variable.element.codegen(state);
            state.add_space(&variable.after);
        }
    }
}

impl Codegen for NamedVariable {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        self.name.codegen(state);
        if let Some(initializer) = &self.initializer {
            state.add_space(&initializer.before);
            state.add_token("=");
            initializer.element.codegen(state);
        }
    }
}

impl Codegen for Annotation {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token("@");
        self.annotation_type.codegen(state);
        if let Some(arguments) = &self.arguments {
            state.add_container(arguments, "(", ",", ")");
        }
    }
}

impl Codegen for Modifier {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token(self.keyword.keyword());
    }
}

impl Codegen for TypeParameter {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        self.name.codegen(state);
        if let Some(bounds) = &self.bounds {
            state.add_container(bounds, "extends", "&", "");
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

impl Codegen for Block {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token("{");
        for statement in &self.statements {
            state.add_statement(statement);
        }
        state.add_space(&self.end);
        state.add_token("}");
    }
}

impl Codegen for Return {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token("return");
        if let Some(expression) = &self.expression {
            expression.codegen(state);
        }
    }
}

impl Codegen for If {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token("if");
        self.condition.codegen(state);
        state.add_statement(&self.then_part);
        if let Some(else_part) = &self.else_part {
            else_part.codegen(state);
        }
    }
}

impl Codegen for Else {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token("else");
        state.add_statement(&self.body);
    }
}

impl Codegen for WhileLoop {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token("while");
        self.condition.codegen(state);
        state.add_statement(&self.body);
    }
}

impl Codegen for Throw {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token("throw");
        self.exception.codegen(state);
    }
}

impl Codegen for Empty {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
    }
}

impl Codegen for Erroneous {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token(&self.text);
    }
}

// ============================================================================
// Expressions
// ============================================================================

impl Codegen for ControlParentheses {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token("(");
        self.tree.element.codegen(state);
        state.add_space(&self.tree.after);
        state.add_token(")");
    }
}

impl Codegen for Parentheses {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token("(");
        self.tree.element.codegen(state);
        state.add_space(&self.tree.after);
        state.add_token(")");
    }
}

impl Codegen for Identifier {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token(&self.simple_name);
    }
}

impl Codegen for ArrayAccess {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        self.indexed.codegen(state);
        state.add_space(&self.index.before);
        state.add_token("[");
        self.index.element.codegen(state);
        state.add_space(&self.end);
        state.add_token("]");
    }
}

impl Codegen for FieldAccess {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        self.target.codegen(state);
        state.add_space(&self.name.before);
        state.add_token(".");
        self.name.element.codegen(state);
    }
}

impl Codegen for Literal {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token(&self.value_source);
    }
}

impl Codegen for MethodInvocation {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        if let Some(select) = &self.select {
            select.element.codegen(state);
            state.add_space(&select.after);
            state.add_token(".");
        }
        self.name.codegen(state);
        state.add_container(&self.arguments, "(", ",", ")");
    }
}

impl Codegen for NewClass {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token("new");
        self.clazz.codegen(state);
        state.add_container(&self.arguments, "(", ",", ")");
        if let Some(body) = &self.body {
            body.codegen(state);
        }
    }
}

impl Codegen for Binary {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        self.left.codegen(state);
        state.add_space(&self.operator.before);
        state.add_token(self.operator.element.symbol());
        self.right.codegen(state);
    }
}

impl Codegen for Unary {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        if self.operator.element.is_postfix() {
            self.expression.codegen(state);
            state.add_space(&self.operator.before);
            state.add_token(self.operator.element.symbol());
        } else {
            state.add_space(&self.operator.before);
            state.add_token(self.operator.element.symbol());
            self.expression.codegen(state);
        }
    }
}

impl Codegen for Assignment {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        self.variable.codegen(state);
        state.add_space(&self.operator.before);
        state.add_token(self.operator.element.symbol());
        self.assignment.codegen(state);
    }
}

impl Codegen for Ternary {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        self.condition.codegen(state);
        state.add_space(&self.true_part.before);
        state.add_token("?");
        self.true_part.element.codegen(state);
        state.add_space(&self.false_part.before);
        state.add_token(":");
        self.false_part.element.codegen(state);
    }
}

// ============================================================================
// Types
// ============================================================================

impl Codegen for Primitive {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        state.add_token(self.kind.keyword());
    }
}

impl Codegen for ParameterizedType {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        self.clazz.codegen(state);
        if let Some(params) = &self.type_parameters {
            state.add_container(params, "<", ",", ">");
        }
    }
}

impl Codegen for ArrayType {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_prefix(&self.prefix, &self.markers);
        self.element_type.codegen(state);
        state.add_space(&self.dimension.before);
        state.add_token("[");
        state.add_space(&self.dimension.element);
        state.add_token("]");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::padding::LeftPadded;

    fn ident(name: &str, prefix: &str) -> Tree {
        Tree::from(Identifier::build(name)).with_prefix(Space::build(prefix))
    }

    #[test]
    fn test_print_binary() {
        let binary = Binary {
            id: treewright_core::NodeId::next(),
            prefix: Space::EMPTY,
            markers: Markers::new(),
            left: ident("a", ""),
            operator: LeftPadded::new(Space::single_space(), BinaryOperator::Addition),
            right: ident("b", " "),
            type_: None,
        };
        assert_eq!(binary.print(), "a + b");
    }

    #[test]
    fn test_search_result_printing_modes() {
        let tree = ident("a", " ").with_search_result(Some("found".to_string()));
        assert_eq!(tree.print(), " /*~~(found)~~>*/a");
        assert_eq!(tree.print_with(&PrintOptions::sanitized()), " a");

        let bare = ident("b", "").with_search_result(None);
        assert_eq!(bare.print(), "/*~~>*/b");
    }

    #[test]
    fn test_verbose_prints_missing_type() {
        let tree = ident("a", "");
        let markers = tree.markers().add(Marker::missing_type("a"));
        let tree = tree.with_markers(markers);
        assert_eq!(tree.print(), "a");
        assert_eq!(
            tree.print_with(&PrintOptions::verbose()),
            "/*~~(missing type: a)~~>*/a"
        );
    }

    #[test]
    fn test_trim_indent() {
        assert_eq!(trim_indent("\n    a\n      b\n    c\n"), "a\n  b\nc");
        assert_eq!(trim_indent("x"), "x");
    }
}
