// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Statements.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use treewright_core::{Markers, NodeId};

use super::{impl_with, Tree};
use crate::padding::RightPadded;
use crate::space::Space;

/// `{ ... }`: a method body, class body or nested block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Statements in source order; `after` is the space before the
    /// statement's `;` when it has one.
    pub statements: Vec<RightPadded<Tree>>,
    /// The space before the closing `}`.
    pub end: Space,
}

impl_with!(Block {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    statements: Vec<RightPadded<Tree>>,
    end: Space,
});

impl Block {
    pub fn new(prefix: Space, statements: Vec<RightPadded<Tree>>, end: Space) -> Self {
        Self {
            id: NodeId::next(),
            prefix,
            markers: Markers::new(),
            statements,
            end,
        }
    }

    pub fn statement_trees(&self) -> impl Iterator<Item = &Tree> {
        self.statements.iter().map(|rp| &rp.element)
    }

    /// Replace the statements, keeping the padding of surviving statements.
    ///
    /// Statements are matched to old ones by node id, then by position, like
    /// [`Container::with_elements`](crate::padding::Container::with_elements).
    /// A statement past the end of the old list that has no prefix of its own
    /// gets the previous statement's prefix; in a block that was empty it gets
    /// a newline plus the block's indentation plus four spaces, and the closing
    /// brace moves to its own line when it was not on one already.
    pub fn with_statement_trees(self: Arc<Self>, statements: Vec<Tree>) -> Arc<Self> {
        let old = &self.statements;
        let block_indent = self.prefix.indent().to_string();
        let mut padded: Vec<RightPadded<Tree>> = Vec::with_capacity(statements.len());
        for (i, statement) in statements.into_iter().enumerate() {
            let matched = old
                .iter()
                .position(|rp| rp.element.id() == statement.id())
                .or(if i < old.len() { Some(i) } else { None });
            match matched {
                Some(pos) => padded.push(old[pos].clone().with_element(statement)),
                None => {
                    let statement = if statement.prefix().is_empty() {
                        let prefix = match padded.last().or(old.last()) {
                            Some(previous) => {
                                Space::build(format!("\n{}", previous.element.prefix().indent()))
                            }
                            None => Space::build(format!("\n{}    ", block_indent)),
                        };
                        debug!(index = i, "synthesized statement prefix");
                        statement.with_prefix(prefix)
                    } else {
                        statement
                    };
                    padded.push(RightPadded::build(statement));
                }
            }
        }

        let end = if old.is_empty() && !padded.is_empty() && !self.end.contains_newline() {
            Space::build(format!("\n{}", block_indent))
        } else {
            self.end.clone()
        };
        self.with_statements(padded).with_end(end)
    }
}

/// `return` or `return expr`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Return {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub expression: Option<Tree>,
}

impl_with!(Return {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    expression: Option<Tree>,
});

/// `if (cond) then [else ...]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct If {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// A `ControlParentheses`.
    pub condition: Tree,
    /// `after` is the space before the statement's `;` when it has one.
    pub then_part: RightPadded<Tree>,
    /// An `Else`.
    pub else_part: Option<Tree>,
}

impl_with!(If {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    condition: Tree,
    then_part: RightPadded<Tree>,
    else_part: Option<Tree>,
});

/// `else body`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Else {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub body: RightPadded<Tree>,
}

impl_with!(Else {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    body: RightPadded<Tree>,
});

/// `while (cond) body`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhileLoop {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub condition: Tree,
    pub body: RightPadded<Tree>,
}

impl_with!(WhileLoop {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    condition: Tree,
    body: RightPadded<Tree>,
});

/// `throw expr`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Throw {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub exception: Tree,
}

impl_with!(Throw {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    exception: Tree,
});

/// The empty statement `;`, and the placeholder for the contents of `( )`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Empty {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
}

impl_with!(Empty {
    id: NodeId,
    prefix: Space,
    markers: Markers,
});

impl Empty {
    pub fn new(prefix: Space) -> Self {
        Self {
            id: NodeId::next(),
            prefix,
            markers: Markers::new(),
        }
    }
}

/// Source the parser could not make sense of, kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Erroneous {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub text: String,
}

impl_with!(Erroneous {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    text: String,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Identifier;

    fn statement(name: &str) -> Tree {
        Tree::from(Identifier::build(name))
    }

    #[test]
    fn test_insert_into_empty_block() {
        let block = Arc::new(Block::new(Space::build(" "), vec![], Space::EMPTY));
        let filled = block.with_statement_trees(vec![statement("a")]);
        assert_eq!(
            filled.statements[0].element.prefix(),
            &Space::build("\n     ")
        );
        assert_eq!(filled.end, Space::build("\n "));
    }

    #[test]
    fn test_insert_copies_previous_indent() {
        let a = statement("a").with_prefix(Space::build("\n        "));
        let block = Arc::new(Block::new(
            Space::build(" "),
            vec![RightPadded::build(a.clone())],
            Space::build("\n    "),
        ));
        let grown = block.with_statement_trees(vec![a, statement("b")]);
        assert_eq!(
            grown.statements[1].element.prefix(),
            &Space::build("\n        ")
        );
        assert_eq!(grown.end, Space::build("\n    "));
    }

    #[test]
    fn test_same_statements_returns_same_block() {
        let a = statement("a");
        let block = Arc::new(Block::new(
            Space::EMPTY,
            vec![RightPadded::build(a.clone())],
            Space::EMPTY,
        ));
        let same = Arc::clone(&block).with_statement_trees(vec![a]);
        assert!(Arc::ptr_eq(&block, &same));
    }
}
