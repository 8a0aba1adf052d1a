// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Expressions and their operators.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use treewright_core::{Markers, NodeId};

use super::{impl_with, Tree};
use crate::padding::{Container, LeftPadded, RightPadded};
use crate::space::Space;
use crate::types::TypeId;

// ============================================================================
// Parentheses
// ============================================================================

/// The parenthesized condition of `if` and `while`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlParentheses {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// `after` is the space before `)`.
    pub tree: RightPadded<Tree>,
}

impl_with!(ControlParentheses {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    tree: RightPadded<Tree>,
});

/// A parenthesized expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parentheses {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub tree: RightPadded<Tree>,
}

impl_with!(Parentheses {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    tree: RightPadded<Tree>,
});

// ============================================================================
// Names
// ============================================================================

/// A simple name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identifier {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub simple_name: String,
    /// The type of the expression (or the named type, in type position).
    pub type_: Option<TypeId>,
    /// The variable handle when this names a field, local or parameter.
    pub field_type: Option<TypeId>,
}

impl_with!(Identifier {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    simple_name: String,
    type_: Option<TypeId>,
    field_type: Option<TypeId>,
});

impl Identifier {
    /// An unattributed identifier with no prefix.
    pub fn build(simple_name: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            prefix: Space::EMPTY,
            markers: Markers::new(),
            simple_name: simple_name.into(),
            type_: None,
            field_type: None,
        }
    }
}

/// `target.name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldAccess {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub target: Tree,
    /// `before` is the space before `.`; the element is an `Identifier`.
    pub name: LeftPadded<Tree>,
    pub type_: Option<TypeId>,
}

impl_with!(FieldAccess {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    target: Tree,
    name: LeftPadded<Tree>,
    type_: Option<TypeId>,
});

impl FieldAccess {
    /// An unattributed `target.name` with no whitespace.
    pub fn build(target: Tree, name: Identifier) -> Self {
        Self {
            id: NodeId::next(),
            prefix: Space::EMPTY,
            markers: Markers::new(),
            target,
            name: LeftPadded::build(Tree::from(name)),
            type_: None,
        }
    }

    pub fn simple_name(&self) -> &str {
        self.name.element.simple_name().unwrap_or_default()
    }
}

/// `indexed[index]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayAccess {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub indexed: Tree,
    /// `before` is the space before `[`.
    pub index: LeftPadded<Tree>,
    /// The space before `]`.
    pub end: Space,
    pub type_: Option<TypeId>,
}

impl_with!(ArrayAccess {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    indexed: Tree,
    index: LeftPadded<Tree>,
    end: Space,
    type_: Option<TypeId>,
});

// ============================================================================
// Literals
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Boolean,
    Null,
}

/// A literal, kept exactly as written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Literal {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub value_source: String,
    pub kind: LiteralKind,
    pub type_: Option<TypeId>,
}

impl_with!(Literal {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    value_source: String,
    kind: LiteralKind,
    type_: Option<TypeId>,
});

// ============================================================================
// Calls
// ============================================================================

/// `select.name(args)` or `name(args)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodInvocation {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// The receiver; `after` is the space before `.`.
    pub select: Option<RightPadded<Tree>>,
    pub name: Tree,
    /// `before` is the space before `(`.
    pub arguments: Container<Tree>,
    /// The invoked method.
    pub method_type: Option<TypeId>,
    /// The type of the call expression (the method's return type).
    pub type_: Option<TypeId>,
}

impl_with!(MethodInvocation {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    select: Option<RightPadded<Tree>>,
    name: Tree,
    arguments: Container<Tree>,
    method_type: Option<TypeId>,
    type_: Option<TypeId>,
});

impl MethodInvocation {
    pub fn simple_name(&self) -> &str {
        self.name.simple_name().unwrap_or_default()
    }
}

/// `new Type(args)` with an optional anonymous class body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClass {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub clazz: Tree,
    pub arguments: Container<Tree>,
    pub body: Option<Tree>,
    pub constructor_type: Option<TypeId>,
    pub type_: Option<TypeId>,
}

impl_with!(NewClass {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    clazz: Tree,
    arguments: Container<Tree>,
    body: Option<Tree>,
    constructor_type: Option<TypeId>,
    type_: Option<TypeId>,
});

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    And,
    Or,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 19] = [
        BinaryOperator::Addition,
        BinaryOperator::Subtraction,
        BinaryOperator::Multiplication,
        BinaryOperator::Division,
        BinaryOperator::Modulo,
        BinaryOperator::LessThan,
        BinaryOperator::GreaterThan,
        BinaryOperator::LessThanOrEqual,
        BinaryOperator::GreaterThanOrEqual,
        BinaryOperator::Equal,
        BinaryOperator::NotEqual,
        BinaryOperator::BitAnd,
        BinaryOperator::BitOr,
        BinaryOperator::BitXor,
        BinaryOperator::LeftShift,
        BinaryOperator::RightShift,
        BinaryOperator::UnsignedRightShift,
        BinaryOperator::And,
        BinaryOperator::Or,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Addition => "+",
            BinaryOperator::Subtraction => "-",
            BinaryOperator::Multiplication => "*",
            BinaryOperator::Division => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::LeftShift => "<<",
            BinaryOperator::RightShift => ">>",
            BinaryOperator::UnsignedRightShift => ">>>",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.symbol() == symbol)
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::BitOr => 3,
            BinaryOperator::BitXor => 4,
            BinaryOperator::BitAnd => 5,
            BinaryOperator::Equal | BinaryOperator::NotEqual => 6,
            BinaryOperator::LessThan
            | BinaryOperator::GreaterThan
            | BinaryOperator::LessThanOrEqual
            | BinaryOperator::GreaterThanOrEqual => 7,
            BinaryOperator::LeftShift
            | BinaryOperator::RightShift
            | BinaryOperator::UnsignedRightShift => 8,
            BinaryOperator::Addition | BinaryOperator::Subtraction => 9,
            BinaryOperator::Multiplication | BinaryOperator::Division | BinaryOperator::Modulo => {
                10
            }
        }
    }

    /// Whether the result is `boolean` regardless of operand types.
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            BinaryOperator::LessThan
                | BinaryOperator::GreaterThan
                | BinaryOperator::LessThanOrEqual
                | BinaryOperator::GreaterThanOrEqual
                | BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::And
                | BinaryOperator::Or
        )
    }
}

/// `left op right`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binary {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub left: Tree,
    pub operator: LeftPadded<BinaryOperator>,
    pub right: Tree,
    pub type_: Option<TypeId>,
}

impl_with!(Binary {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    left: Tree,
    operator: LeftPadded<BinaryOperator>,
    right: Tree,
    type_: Option<TypeId>,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
    Positive,
    Negative,
    Complement,
    Not,
}

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::PreIncrement | UnaryOperator::PostIncrement => "++",
            UnaryOperator::PreDecrement | UnaryOperator::PostDecrement => "--",
            UnaryOperator::Positive => "+",
            UnaryOperator::Negative => "-",
            UnaryOperator::Complement => "~",
            UnaryOperator::Not => "!",
        }
    }

    pub fn is_postfix(&self) -> bool {
        matches!(
            self,
            UnaryOperator::PostIncrement | UnaryOperator::PostDecrement
        )
    }

    /// Whether the operator writes back to its operand.
    pub fn is_modifying(&self) -> bool {
        matches!(
            self,
            UnaryOperator::PreIncrement
                | UnaryOperator::PreDecrement
                | UnaryOperator::PostIncrement
                | UnaryOperator::PostDecrement
        )
    }
}

/// A prefix or postfix unary expression. For prefix operators the operator
/// immediately follows the node prefix; for postfix operators `before` is the
/// space between the operand and the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unary {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub operator: LeftPadded<UnaryOperator>,
    pub expression: Tree,
    pub type_: Option<TypeId>,
}

impl_with!(Unary {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    operator: LeftPadded<UnaryOperator>,
    expression: Tree,
    type_: Option<TypeId>,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    UnsignedShiftRightAssign,
}

impl AssignmentOperator {
    pub const ALL: [AssignmentOperator; 12] = [
        AssignmentOperator::Assign,
        AssignmentOperator::AddAssign,
        AssignmentOperator::SubAssign,
        AssignmentOperator::MulAssign,
        AssignmentOperator::DivAssign,
        AssignmentOperator::ModAssign,
        AssignmentOperator::AndAssign,
        AssignmentOperator::OrAssign,
        AssignmentOperator::XorAssign,
        AssignmentOperator::ShiftLeftAssign,
        AssignmentOperator::ShiftRightAssign,
        AssignmentOperator::UnsignedShiftRightAssign,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::AddAssign => "+=",
            AssignmentOperator::SubAssign => "-=",
            AssignmentOperator::MulAssign => "*=",
            AssignmentOperator::DivAssign => "/=",
            AssignmentOperator::ModAssign => "%=",
            AssignmentOperator::AndAssign => "&=",
            AssignmentOperator::OrAssign => "|=",
            AssignmentOperator::XorAssign => "^=",
            AssignmentOperator::ShiftLeftAssign => "<<=",
            AssignmentOperator::ShiftRightAssign => ">>=",
            AssignmentOperator::UnsignedShiftRightAssign => ">>>=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.symbol() == symbol)
    }

    /// Whether the new value is derived from the old one (`+=` and friends).
    pub fn is_compound(&self) -> bool {
        *self != AssignmentOperator::Assign
    }
}

/// `variable op= assignment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub variable: Tree,
    /// `before` is the space before the operator.
    pub operator: LeftPadded<AssignmentOperator>,
    pub assignment: Tree,
    pub type_: Option<TypeId>,
}

impl_with!(Assignment {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    variable: Tree,
    operator: LeftPadded<AssignmentOperator>,
    assignment: Tree,
    type_: Option<TypeId>,
});

/// `condition ? true_part : false_part`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ternary {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub condition: Tree,
    /// `before` is the space before `?`.
    pub true_part: LeftPadded<Tree>,
    /// `before` is the space before `:`.
    pub false_part: LeftPadded<Tree>,
    pub type_: Option<TypeId>,
}

impl_with!(Ternary {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    condition: Tree,
    true_part: LeftPadded<Tree>,
    false_part: LeftPadded<Tree>,
    type_: Option<TypeId>,
});

/// Strip any number of enclosing parentheses.
pub fn unwrap_parentheses(tree: &Tree) -> &Tree {
    match tree {
        Tree::Parentheses(p) => unwrap_parentheses(&p.tree.element),
        _ => tree,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_symbols_round_trip() {
        for op in BinaryOperator::ALL {
            assert_eq!(BinaryOperator::from_symbol(op.symbol()), Some(op));
        }
        for op in AssignmentOperator::ALL {
            assert_eq!(AssignmentOperator::from_symbol(op.symbol()), Some(op));
        }
    }

    #[test]
    fn test_precedence() {
        assert!(BinaryOperator::Multiplication.precedence() > BinaryOperator::Addition.precedence());
        assert!(BinaryOperator::And.precedence() > BinaryOperator::Or.precedence());
    }

    #[test]
    fn test_field_access_with_name_keeps_target() {
        let access = Arc::new(FieldAccess::build(
            Tree::from(Identifier::build("a")),
            Identifier::build("b"),
        ));
        let target = access.target.clone();
        let renamed = Arc::clone(&access)
            .with_name(LeftPadded::build(Tree::from(Identifier::build("c"))));
        assert!(renamed.target.ptr_eq(&target));
        assert_eq!(renamed.simple_name(), "c");
        assert_eq!(access.simple_name(), "b");
    }
}
