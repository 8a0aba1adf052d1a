// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recursive-descent grammar for the Java subset.
//!
//! Every token's prefix ends up in exactly one `Space` of the tree. When a
//! node starts with a child (a binary expression starts with its left
//! operand), the child's prefix is moved up to the node, so the prefix of a
//! statement is always the whitespace in front of it.
//!
//! Syntax errors are recovered at three levels: statements in a block,
//! members in a class body, and top-level declarations. The tokens of the
//! failed construct (up to and including its `;` or its closing `}`) become
//! an [`Erroneous`] node carrying a `ParseExceptionResult` marker.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};
use treewright_core::text::offset_to_position;
use treewright_core::{Marker, Markers, NodeId};

use super::tokenizer::{Token, TokenKind};
use crate::padding::{Container, LeftPadded, RightPadded};
use crate::space::Space;
use crate::tree::*;
use crate::types::{ClassKind, PrimitiveKind, TypeTable};

/// A syntax error inside a recoverable construct.
#[derive(Debug)]
pub(crate) struct SyntaxError {
    message: String,
}

type PResult<T> = Result<T, SyntaxError>;

/// Build a node struct with a fresh id and no markers.
macro_rules! node {
    ($ty:ident { $($field:ident : $value:expr),* $(,)? }) => {
        Tree::from($ty {
            id: NodeId::next(),
            markers: Markers::new(),
            $($field: $value),*
        })
    };
}

/// Move a tree's prefix out so an enclosing node can own it.
fn hoist(tree: Tree) -> (Space, Tree) {
    let prefix = tree.prefix().clone();
    (prefix, tree.with_prefix(Space::EMPTY))
}

fn hoist_first(trees: &mut [Tree]) -> Option<Space> {
    let first = trees.first_mut()?;
    let prefix = first.prefix().clone();
    *first = first.clone().with_prefix(Space::EMPTY);
    Some(prefix)
}

fn identifier(prefix: Space, name: &str) -> Tree {
    node!(Identifier {
        prefix: prefix,
        simple_name: name.to_string(),
        type_: None,
        field_type: None,
    })
}

pub(crate) struct Parser<'a> {
    source: &'a str,
    path: &'a Path,
    tokens: Vec<Token<'a>>,
    pos: usize,
    log_recovery: bool,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(
        source: &'a str,
        path: &'a Path,
        tokens: Vec<Token<'a>>,
        log_recovery: bool,
    ) -> Self {
        Self {
            source,
            path,
            tokens,
            pos: 0,
            log_recovery,
        }
    }

    // ========================================================================
    // Token access
    // ========================================================================

    fn peek(&self) -> &Token<'a> {
        self.peek_at(0)
    }

    /// The token `n` places ahead; the end-of-file token past the end.
    fn peek_at(&self, n: usize) -> &Token<'a> {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn at(&self, text: &str) -> bool {
        let token = self.peek();
        token.kind != TokenKind::Eof && token.text == text
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn bump(&mut self) -> Token<'a> {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn expect(&mut self, text: &str) -> PResult<Space> {
        if self.at(text) {
            Ok(self.bump().prefix)
        } else {
            Err(self.error(&format!("expected `{}`", text)))
        }
    }

    fn error(&self, message: &str) -> SyntaxError {
        let token = self.peek();
        let found = if token.kind == TokenKind::Eof {
            "end of file".to_string()
        } else {
            format!("`{}`", token.text)
        };
        SyntaxError {
            message: format!(
                "{}, found {} at {}",
                message,
                found,
                offset_to_position(self.source, token.start)
            ),
        }
    }

    fn ident(&mut self) -> PResult<Tree> {
        if self.peek().kind == TokenKind::Identifier {
            let token = self.bump();
            Ok(identifier(token.prefix, token.text))
        } else {
            Err(self.error("expected an identifier"))
        }
    }

    /// The operator at the current token, rejoining adjacent `>` and `=`
    /// tokens, with the number of tokens it spans.
    fn peek_operator(&self) -> Option<(String, usize)> {
        let token = self.peek();
        if token.kind != TokenKind::Symbol {
            return None;
        }
        if token.text != ">" {
            return Some((token.text.to_string(), 1));
        }
        let mut op = String::from(">");
        let mut n = 1;
        while n < 3 {
            let next = self.peek_at(n);
            if next.text == ">" && next.prefix.is_empty() {
                op.push('>');
                n += 1;
            } else {
                break;
            }
        }
        let next = self.peek_at(n);
        if next.text == "=" && next.prefix.is_empty() {
            op.push('=');
            n += 1;
        }
        Some((op, n))
    }

    // ========================================================================
    // Recovery
    // ========================================================================

    /// Rewind to `start` and turn the tokens of the failed construct into an
    /// `Erroneous` node.
    fn recover(&mut self, start: usize, error: SyntaxError) -> Tree {
        self.pos = start;
        let mut depth = 0usize;
        loop {
            let token = self.peek();
            if token.kind == TokenKind::Eof {
                break;
            }
            match token.text {
                "{" | "(" | "[" => depth += 1,
                ")" | "]" => depth = depth.saturating_sub(1),
                "}" => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        break;
                    }
                }
                ";" if depth == 0 => {
                    self.bump();
                    break;
                }
                _ => {}
            }
            self.bump();
        }
        if self.pos == start && !self.at_eof() {
            self.bump();
        }

        let first = &self.tokens[start];
        let end = self.tokens[self.pos.max(start + 1) - 1].end;
        let text = self.source[first.start..end].to_string();
        let position = offset_to_position(self.source, first.start);
        if self.log_recovery {
            warn!(path = %self.path.display(), %position, message = %error.message, "keeping unparseable source as an erroneous node");
        } else {
            debug!(path = %self.path.display(), %position, message = %error.message, "erroneous node");
        }
        Tree::from(Erroneous {
            id: NodeId::next(),
            prefix: first.prefix.clone(),
            markers: Markers::new().add(Marker::parse_exception(error.message)),
            text,
        })
    }

    // ========================================================================
    // Compilation units
    // ========================================================================

    pub(crate) fn compilation_unit(mut self, types: Arc<TypeTable>) -> CompilationUnit {
        let mut classes = Vec::new();

        let mut package = None;
        if self.at("package") {
            let start = self.pos;
            match self.package() {
                Ok(p) => package = Some(p),
                Err(e) => classes.push(self.recover(start, e)),
            }
        }

        let mut imports = Vec::new();
        while classes.is_empty() && self.at("import") {
            let start = self.pos;
            match self.import() {
                Ok(i) => imports.push(i),
                Err(e) => classes.push(self.recover(start, e)),
            }
        }

        while !self.at_eof() {
            let start = self.pos;
            match self.type_declaration() {
                Ok(class) => classes.push(class),
                Err(e) => classes.push(self.recover(start, e)),
            }
        }

        let eof = self.peek().prefix.clone();
        debug!(path = %self.path.display(), tokens = self.tokens.len(), "parsed compilation unit");
        CompilationUnit::new(
            Space::EMPTY,
            self.path.to_path_buf(),
            package,
            imports,
            classes,
            eof,
            types,
        )
    }

    fn package(&mut self) -> PResult<RightPadded<Tree>> {
        let prefix = self.expect("package")?;
        let expression = self.qualified_name()?;
        let after = self.expect(";")?;
        Ok(RightPadded::new(
            node!(Package {
                prefix: prefix,
                expression: expression,
            }),
            after,
        ))
    }

    fn import(&mut self) -> PResult<RightPadded<Tree>> {
        let prefix = self.expect("import")?;
        let is_static = if self.at("static") {
            LeftPadded::new(self.bump().prefix, true)
        } else {
            LeftPadded::build(false)
        };
        let qualid = self.qualified_name()?;
        let after = self.expect(";")?;
        Ok(RightPadded::new(
            node!(Import {
                prefix: prefix,
                is_static: is_static,
                qualid: qualid,
            }),
            after,
        ))
    }

    fn type_declaration(&mut self) -> PResult<Tree> {
        let (mut leading, mut modifiers) = self.modifiers()?;
        let prefix = hoist_first(&mut leading).or_else(|| hoist_first(&mut modifiers));
        if self.at_class_start() {
            self.class_declaration(prefix, leading, modifiers)
        } else {
            Err(self.error("expected a class or interface declaration"))
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn at_class_start(&self) -> bool {
        self.at("class")
            || self.at("interface")
            || self.at("enum")
            || (self.at("@") && self.peek_at(1).text == "interface")
    }

    /// Annotations before the first modifier, then modifiers (with any
    /// annotations interleaved with them).
    fn modifiers(&mut self) -> PResult<(Vec<Tree>, Vec<Tree>)> {
        let mut leading = Vec::new();
        let mut modifiers = Vec::new();
        loop {
            if self.at("@") && self.peek_at(1).text != "interface" {
                let annotation = self.annotation()?;
                if modifiers.is_empty() {
                    leading.push(annotation);
                } else {
                    modifiers.push(annotation);
                }
                continue;
            }
            let token = self.peek();
            match ModifierKind::from_keyword(token.text) {
                Some(kind) if token.kind == TokenKind::Keyword => {
                    let prefix = self.bump().prefix;
                    modifiers.push(Tree::from(Modifier::new(prefix, kind)));
                }
                _ => break,
            }
        }
        Ok((leading, modifiers))
    }

    fn annotation(&mut self) -> PResult<Tree> {
        let prefix = self.expect("@")?;
        let annotation_type = self.qualified_name()?;
        let arguments = if self.at("(") {
            let before = self.bump().prefix;
            Some(self.delimited(before, ")", Self::expression)?)
        } else {
            None
        };
        Ok(node!(Annotation {
            prefix: prefix,
            annotation_type: annotation_type,
            arguments: arguments,
        }))
    }

    fn class_declaration(
        &mut self,
        prefix: Option<Space>,
        leading_annotations: Vec<Tree>,
        modifiers: Vec<Tree>,
    ) -> PResult<Tree> {
        let keyword = self.bump();
        let kind = match keyword.text {
            "class" => ClassKind::Class,
            "interface" => ClassKind::Interface,
            "enum" => ClassKind::Enum,
            _ => {
                let interface = self.bump();
                if interface.text != "interface" || !interface.prefix.is_empty() {
                    return Err(self.error("expected `@interface`"));
                }
                ClassKind::Annotation
            }
        };
        let (prefix, kind_before) = match prefix {
            Some(prefix) => (prefix, keyword.prefix),
            None => (keyword.prefix, Space::EMPTY),
        };

        let name = self.ident()?;
        let type_parameters = if self.at("<") {
            let before = self.bump().prefix;
            Some(self.delimited(before, ">", Self::type_parameter)?)
        } else {
            None
        };
        let extends = if kind != ClassKind::Interface && self.at("extends") {
            let before = self.bump().prefix;
            Some(LeftPadded::new(before, self.type_tree()?))
        } else {
            None
        };
        let implements_keyword = if kind == ClassKind::Interface {
            "extends"
        } else {
            "implements"
        };
        let implements = if self.at(implements_keyword) {
            let before = self.bump().prefix;
            Some(self.separated(before, ",", Self::type_tree)?)
        } else {
            None
        };
        let body = self.braced(Self::member)?;

        Ok(node!(ClassDeclaration {
            prefix: prefix,
            leading_annotations: leading_annotations,
            modifiers: modifiers,
            kind: LeftPadded::new(kind_before, kind),
            name: name,
            type_parameters: type_parameters,
            extends: extends,
            implements: implements,
            body: body,
            class_type: None,
        }))
    }

    fn type_parameter(&mut self) -> PResult<Tree> {
        let (prefix, name) = hoist(self.ident()?);
        let bounds = if self.at("extends") {
            let before = self.bump().prefix;
            Some(self.separated(before, "&", Self::type_tree)?)
        } else {
            None
        };
        Ok(node!(TypeParameter {
            prefix: prefix,
            name: name,
            bounds: bounds,
        }))
    }

    /// A class body member: field, method, constructor or nested type.
    fn member(&mut self) -> PResult<Tree> {
        if self.at(";") {
            return Ok(Tree::from(Empty::new(Space::EMPTY)));
        }
        let (mut leading, mut modifiers) = self.modifiers()?;
        let prefix = hoist_first(&mut leading).or_else(|| hoist_first(&mut modifiers));
        if self.at_class_start() {
            return self.class_declaration(prefix, leading, modifiers);
        }

        let mut type_parameters = if self.at("<") {
            let before = self.bump().prefix;
            Some(self.delimited(before, ">", Self::type_parameter)?)
        } else {
            None
        };
        let prefix =
            prefix.or_else(|| type_parameters.as_mut().map(|c| std::mem::take(&mut c.before)));

        // Constructor: `Name(`
        if self.peek().kind == TokenKind::Identifier && self.peek_at(1).text == "(" {
            let name = self.ident()?;
            let (prefix, name) = match prefix {
                Some(prefix) => (prefix, name),
                None => hoist(name),
            };
            return self.method_rest(prefix, leading, modifiers, type_parameters, None, name);
        }

        let type_expression = self.type_tree()?;
        let (prefix, type_expression) = match prefix {
            Some(prefix) => (prefix, type_expression),
            None => hoist(type_expression),
        };
        let name = self.ident()?;
        if self.at("(") {
            return self.method_rest(
                prefix,
                leading,
                modifiers,
                type_parameters,
                Some(type_expression),
                name,
            );
        }
        if type_parameters.is_some() {
            return Err(self.error("expected `(`"));
        }

        let variables = self.declarators(name)?;
        Ok(node!(VariableDeclarations {
            prefix: prefix,
            leading_annotations: leading,
            modifiers: modifiers,
            type_expression: Some(type_expression),
            varargs: None,
            variables: variables,
        }))
    }

    #[allow(clippy::too_many_arguments)]
    fn method_rest(
        &mut self,
        prefix: Space,
        leading_annotations: Vec<Tree>,
        modifiers: Vec<Tree>,
        type_parameters: Option<Container<Tree>>,
        return_type: Option<Tree>,
        name: Tree,
    ) -> PResult<Tree> {
        let before = self.expect("(")?;
        let parameters = self.delimited(before, ")", Self::parameter)?;
        let throws = if self.at("throws") {
            let before = self.bump().prefix;
            Some(self.separated(before, ",", Self::type_tree)?)
        } else {
            None
        };
        let body = if self.at("{") {
            Some(self.braced(Self::statement)?)
        } else {
            None
        };
        Ok(node!(MethodDeclaration {
            prefix: prefix,
            leading_annotations: leading_annotations,
            modifiers: modifiers,
            type_parameters: type_parameters,
            return_type: return_type,
            name: name,
            parameters: parameters,
            throws: throws,
            body: body,
            method_type: None,
        }))
    }

    fn parameter(&mut self) -> PResult<Tree> {
        let (mut leading, mut modifiers) = self.modifiers()?;
        let prefix = hoist_first(&mut leading).or_else(|| hoist_first(&mut modifiers));
        let type_expression = self.type_tree()?;
        let (prefix, type_expression) = match prefix {
            Some(prefix) => (prefix, type_expression),
            None => hoist(type_expression),
        };
        let varargs = if self.at("...") {
            Some(self.bump().prefix)
        } else {
            None
        };
        let (name_prefix, name) = hoist(self.ident()?);
        let variable = node!(NamedVariable {
            prefix: name_prefix,
            name: name,
            initializer: None,
            variable_type: None,
        });
        Ok(node!(VariableDeclarations {
            prefix: prefix,
            leading_annotations: leading,
            modifiers: modifiers,
            type_expression: Some(type_expression),
            varargs: varargs,
            variables: vec![RightPadded::build(variable)],
        }))
    }

    /// `a = 1, b, c = 2` with the first name already consumed.
    fn declarators(&mut self, first: Tree) -> PResult<Vec<RightPadded<Tree>>> {
        let mut variables = Vec::new();
        let mut name = first;
        loop {
            let (prefix, bare) = hoist(name);
            let initializer = if self.at("=") {
                let before = self.bump().prefix;
                Some(LeftPadded::new(before, self.expression()?))
            } else {
                None
            };
            let variable = node!(NamedVariable {
                prefix: prefix,
                name: bare,
                initializer: initializer,
                variable_type: None,
            });
            if self.at(",") {
                let after = self.bump().prefix;
                variables.push(RightPadded::new(variable, after));
                name = self.ident()?;
            } else {
                variables.push(RightPadded::build(variable));
                return Ok(variables);
            }
        }
    }

    // ========================================================================
    // Lists
    // ========================================================================

    /// `{ item; item; }` with per-item recovery.
    fn braced(&mut self, mut item: impl FnMut(&mut Self) -> PResult<Tree>) -> PResult<Tree> {
        let prefix = self.expect("{")?;
        let mut statements = Vec::new();
        while !self.at("}") && !self.at_eof() {
            let start = self.pos;
            match self.padded(&mut item) {
                Ok(rp) => statements.push(rp),
                Err(e) => statements.push(RightPadded::build(self.recover(start, e))),
            }
        }
        let end = self.expect("}")?;
        Ok(Tree::from(Block::new(prefix, statements, end)))
    }

    /// An item followed by its `;` when it needs one.
    fn padded(
        &mut self,
        item: &mut impl FnMut(&mut Self) -> PResult<Tree>,
    ) -> PResult<RightPadded<Tree>> {
        let tree = item(self)?;
        let after = if tree.needs_semicolon() {
            self.expect(";")?
        } else {
            Space::EMPTY
        };
        Ok(RightPadded::new(tree, after))
    }

    /// Elements up to `close` (the opening delimiter was consumed). An empty
    /// list holds one `Empty` carrying the space before `close`.
    fn delimited(
        &mut self,
        before: Space,
        close: &str,
        mut element: impl FnMut(&mut Self) -> PResult<Tree>,
    ) -> PResult<Container<Tree>> {
        if self.at(close) {
            let prefix = self.bump().prefix;
            return Ok(Container::new(
                before,
                vec![RightPadded::build(Tree::from(Empty::new(prefix)))],
            ));
        }
        let mut elements = Vec::new();
        loop {
            let tree = element(self)?;
            if self.at(",") {
                let after = self.bump().prefix;
                elements.push(RightPadded::new(tree, after));
            } else {
                let after = self.expect(close)?;
                elements.push(RightPadded::new(tree, after));
                return Ok(Container::new(before, elements));
            }
        }
    }

    /// Elements joined by `separator` with no closing delimiter.
    fn separated(
        &mut self,
        before: Space,
        separator: &str,
        mut element: impl FnMut(&mut Self) -> PResult<Tree>,
    ) -> PResult<Container<Tree>> {
        let mut elements = Vec::new();
        loop {
            let tree = element(self)?;
            if self.at(separator) {
                let after = self.bump().prefix;
                elements.push(RightPadded::new(tree, after));
            } else {
                elements.push(RightPadded::build(tree));
                return Ok(Container::new(before, elements));
            }
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn qualified_name(&mut self) -> PResult<Tree> {
        let mut tree = self.ident()?;
        while self.at(".") {
            let next = self.peek_at(1);
            if next.kind != TokenKind::Identifier && next.text != "*" {
                break;
            }
            let before = self.bump().prefix;
            let token = self.bump();
            let (prefix, target) = hoist(tree);
            tree = node!(FieldAccess {
                prefix: prefix,
                target: target,
                name: LeftPadded::new(before, identifier(token.prefix, token.text)),
                type_: None,
            });
        }
        Ok(tree)
    }

    fn type_tree(&mut self) -> PResult<Tree> {
        let token = self.peek();
        let primitive = match token.kind {
            TokenKind::Keyword => PrimitiveKind::from_keyword(token.text),
            _ => None,
        };
        let mut tree = match primitive {
            Some(kind) => {
                let prefix = self.bump().prefix;
                node!(Primitive {
                    prefix: prefix,
                    kind: kind,
                    type_: None,
                })
            }
            None => {
                let name = self.qualified_name()?;
                if self.at("<") {
                    let before = self.bump().prefix;
                    let arguments = self.delimited(before, ">", Self::type_argument)?;
                    let (prefix, clazz) = hoist(name);
                    node!(ParameterizedType {
                        prefix: prefix,
                        clazz: clazz,
                        type_parameters: Some(arguments),
                        type_: None,
                    })
                } else {
                    name
                }
            }
        };
        while self.at("[") && self.peek_at(1).text == "]" {
            let before = self.bump().prefix;
            let inner = self.bump().prefix;
            let (prefix, element_type) = hoist(tree);
            tree = node!(ArrayType {
                prefix: prefix,
                element_type: element_type,
                dimension: LeftPadded::new(before, inner),
                type_: None,
            });
        }
        Ok(tree)
    }

    fn type_argument(&mut self) -> PResult<Tree> {
        if self.at("?") {
            return Err(self.error("wildcard type arguments are not supported"));
        }
        self.type_tree()
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement(&mut self) -> PResult<Tree> {
        let token = self.peek();
        let keyword = match token.kind {
            TokenKind::Keyword | TokenKind::Symbol => token.text,
            _ => "",
        };
        match keyword {
            "{" => self.braced(Self::statement),
            ";" => Ok(Tree::from(Empty::new(Space::EMPTY))),
            "return" => {
                let prefix = self.bump().prefix;
                let expression = if self.at(";") {
                    None
                } else {
                    Some(self.expression()?)
                };
                Ok(node!(Return {
                    prefix: prefix,
                    expression: expression,
                }))
            }
            "if" => {
                let prefix = self.bump().prefix;
                let condition = self.control_parentheses()?;
                let then_part = self.statement_body()?;
                let else_part = if self.at("else") {
                    let else_prefix = self.bump().prefix;
                    let body = self.statement_body()?;
                    Some(node!(Else {
                        prefix: else_prefix,
                        body: body,
                    }))
                } else {
                    None
                };
                Ok(node!(If {
                    prefix: prefix,
                    condition: condition,
                    then_part: then_part,
                    else_part: else_part,
                }))
            }
            "while" => {
                let prefix = self.bump().prefix;
                let condition = self.control_parentheses()?;
                let body = self.statement_body()?;
                Ok(node!(WhileLoop {
                    prefix: prefix,
                    condition: condition,
                    body: body,
                }))
            }
            "throw" => {
                let prefix = self.bump().prefix;
                let exception = self.expression()?;
                Ok(node!(Throw {
                    prefix: prefix,
                    exception: exception,
                }))
            }
            _ if self.local_variable_ahead() => self.local_variable(),
            _ => self.expression(),
        }
    }

    fn statement_body(&mut self) -> PResult<RightPadded<Tree>> {
        self.padded(&mut Self::statement)
    }

    fn control_parentheses(&mut self) -> PResult<Tree> {
        let prefix = self.expect("(")?;
        let tree = self.expression()?;
        let after = self.expect(")")?;
        Ok(node!(ControlParentheses {
            prefix: prefix,
            tree: RightPadded::new(tree, after),
        }))
    }

    /// Whether the statement ahead declares a local variable: it starts with
    /// `final`, an annotation or a primitive type, or with a type followed by
    /// a name.
    fn local_variable_ahead(&mut self) -> bool {
        let token = self.peek();
        if token.text == "final" || token.text == "@" {
            return true;
        }
        if token.kind == TokenKind::Keyword {
            return PrimitiveKind::from_keyword(token.text).is_some();
        }
        if token.kind != TokenKind::Identifier {
            return false;
        }
        let start = self.pos;
        let declares = self.type_tree().is_ok() && self.peek().kind == TokenKind::Identifier;
        self.pos = start;
        declares
    }

    fn local_variable(&mut self) -> PResult<Tree> {
        let (mut leading, mut modifiers) = self.modifiers()?;
        let prefix = hoist_first(&mut leading).or_else(|| hoist_first(&mut modifiers));
        let type_expression = self.type_tree()?;
        let (prefix, type_expression) = match prefix {
            Some(prefix) => (prefix, type_expression),
            None => hoist(type_expression),
        };
        let name = self.ident()?;
        let variables = self.declarators(name)?;
        Ok(node!(VariableDeclarations {
            prefix: prefix,
            leading_annotations: leading,
            modifiers: modifiers,
            type_expression: Some(type_expression),
            varargs: None,
            variables: variables,
        }))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&mut self) -> PResult<Tree> {
        let lhs = self.ternary()?;
        let operator = self
            .peek_operator()
            .and_then(|(op, n)| AssignmentOperator::from_symbol(&op).map(|kind| (kind, n)));
        match operator {
            Some((kind, n)) => {
                let before = self.peek().prefix.clone();
                self.advance(n);
                let assignment = self.expression()?;
                let (prefix, variable) = hoist(lhs);
                Ok(node!(Assignment {
                    prefix: prefix,
                    variable: variable,
                    operator: LeftPadded::new(before, kind),
                    assignment: assignment,
                    type_: None,
                }))
            }
            None => Ok(lhs),
        }
    }

    fn ternary(&mut self) -> PResult<Tree> {
        let condition = self.binary(1)?;
        if !self.at("?") {
            return Ok(condition);
        }
        let question = self.bump().prefix;
        let true_part = self.expression()?;
        let colon = self.expect(":")?;
        let false_part = self.ternary()?;
        let (prefix, condition) = hoist(condition);
        Ok(node!(Ternary {
            prefix: prefix,
            condition: condition,
            true_part: LeftPadded::new(question, true_part),
            false_part: LeftPadded::new(colon, false_part),
            type_: None,
        }))
    }

    /// Precedence climbing over the binary operators.
    fn binary(&mut self, min_precedence: u8) -> PResult<Tree> {
        let mut left = self.unary()?;
        loop {
            let Some((op, n)) = self.peek_operator() else {
                break;
            };
            let Some(kind) = BinaryOperator::from_symbol(&op) else {
                break;
            };
            let precedence = kind.precedence();
            if precedence < min_precedence {
                break;
            }
            let before = self.peek().prefix.clone();
            self.advance(n);
            let right = self.binary(precedence + 1)?;
            let (prefix, operand) = hoist(left);
            left = node!(Binary {
                prefix: prefix,
                left: operand,
                operator: LeftPadded::new(before, kind),
                right: right,
                type_: None,
            });
        }
        Ok(left)
    }

    fn unary(&mut self) -> PResult<Tree> {
        let token = self.peek();
        let operator = match (token.kind, token.text) {
            (TokenKind::Symbol, "++") => Some(UnaryOperator::PreIncrement),
            (TokenKind::Symbol, "--") => Some(UnaryOperator::PreDecrement),
            (TokenKind::Symbol, "+") => Some(UnaryOperator::Positive),
            (TokenKind::Symbol, "-") => Some(UnaryOperator::Negative),
            (TokenKind::Symbol, "~") => Some(UnaryOperator::Complement),
            (TokenKind::Symbol, "!") => Some(UnaryOperator::Not),
            _ => None,
        };
        if let Some(operator) = operator {
            let prefix = self.bump().prefix;
            let expression = self.unary()?;
            return Ok(node!(Unary {
                prefix: prefix,
                operator: LeftPadded::build(operator),
                expression: expression,
                type_: None,
            }));
        }
        let primary = self.primary()?;
        self.postfix(primary)
    }

    fn postfix(&mut self, mut expression: Tree) -> PResult<Tree> {
        loop {
            if self.at(".") {
                if self.peek_at(1).kind != TokenKind::Identifier {
                    return Err(self.error("expected a member name after `.`"));
                }
                let before = self.bump().prefix;
                let name = self.ident()?;
                let (prefix, target) = hoist(expression);
                expression = if self.at("(") {
                    let arguments = self.arguments()?;
                    node!(MethodInvocation {
                        prefix: prefix,
                        select: Some(RightPadded::new(target, before)),
                        name: name,
                        arguments: arguments,
                        method_type: None,
                        type_: None,
                    })
                } else {
                    node!(FieldAccess {
                        prefix: prefix,
                        target: target,
                        name: LeftPadded::new(before, name),
                        type_: None,
                    })
                };
            } else if self.at("[") {
                let before = self.bump().prefix;
                let index = self.expression()?;
                let end = self.expect("]")?;
                let (prefix, indexed) = hoist(expression);
                expression = node!(ArrayAccess {
                    prefix: prefix,
                    indexed: indexed,
                    index: LeftPadded::new(before, index),
                    end: end,
                    type_: None,
                });
            } else if self.at("++") || self.at("--") {
                let operator = if self.at("++") {
                    UnaryOperator::PostIncrement
                } else {
                    UnaryOperator::PostDecrement
                };
                let before = self.bump().prefix;
                let (prefix, operand) = hoist(expression);
                expression = node!(Unary {
                    prefix: prefix,
                    operator: LeftPadded::new(before, operator),
                    expression: operand,
                    type_: None,
                });
            } else {
                return Ok(expression);
            }
        }
    }

    fn primary(&mut self) -> PResult<Tree> {
        let token = self.peek().clone();
        let literal_kind = match token.kind {
            TokenKind::IntLiteral => Some(LiteralKind::Int),
            TokenKind::LongLiteral => Some(LiteralKind::Long),
            TokenKind::FloatLiteral => Some(LiteralKind::Float),
            TokenKind::DoubleLiteral => Some(LiteralKind::Double),
            TokenKind::CharLiteral => Some(LiteralKind::Char),
            TokenKind::StringLiteral => Some(LiteralKind::String),
            TokenKind::Keyword if token.text == "true" || token.text == "false" => {
                Some(LiteralKind::Boolean)
            }
            TokenKind::Keyword if token.text == "null" => Some(LiteralKind::Null),
            _ => None,
        };
        if let Some(kind) = literal_kind {
            self.bump();
            return Ok(node!(Literal {
                prefix: token.prefix,
                value_source: token.text.to_string(),
                kind: kind,
                type_: None,
            }));
        }

        match (token.kind, token.text) {
            (TokenKind::Identifier, _) | (TokenKind::Keyword, "this" | "super") => {
                self.bump();
                let name = identifier(token.prefix, token.text);
                if self.at("(") {
                    let arguments = self.arguments()?;
                    let (prefix, name) = hoist(name);
                    Ok(node!(MethodInvocation {
                        prefix: prefix,
                        select: None,
                        name: name,
                        arguments: arguments,
                        method_type: None,
                        type_: None,
                    }))
                } else {
                    Ok(name)
                }
            }
            (TokenKind::Keyword, "new") => {
                self.bump();
                let clazz = self.type_tree()?;
                let arguments = self.arguments()?;
                let body = if self.at("{") {
                    Some(self.braced(Self::member)?)
                } else {
                    None
                };
                Ok(node!(NewClass {
                    prefix: token.prefix,
                    clazz: clazz,
                    arguments: arguments,
                    body: body,
                    constructor_type: None,
                    type_: None,
                }))
            }
            (TokenKind::Symbol, "(") => {
                self.bump();
                let tree = self.expression()?;
                let after = self.expect(")")?;
                Ok(node!(Parentheses {
                    prefix: token.prefix,
                    tree: RightPadded::new(tree, after),
                }))
            }
            _ => Err(self.error("expected an expression")),
        }
    }

    fn arguments(&mut self) -> PResult<Container<Tree>> {
        let before = self.expect("(")?;
        self.delimited(before, ")", Self::expression)
    }
}
