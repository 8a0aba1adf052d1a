// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The tree node model.
//!
//! Every node variant is an immutable struct held behind an `Arc` inside the
//! [`Tree`] sum type. Nodes share the same three leading fields:
//!
//! - `id`: a [`NodeId`] that survives copy-on-write updates
//! - `prefix`: the [`Space`] before the node's first token
//! - `markers`: the node's [`Markers`]
//!
//! # Copy-on-write updates
//!
//! Each field `f` has a `with_f(self: Arc<Self>, value) -> Arc<Self>` method.
//! If `value` is the same as the current value (reference equality for child
//! trees, value equality for everything else) the original `Arc` is returned
//! untouched; otherwise a shallow copy with the new value is allocated. A
//! change deep in the tree therefore rebuilds exactly the ancestors on the
//! path to the root, and everything else stays shared.
//!
//! `Tree::ptr_eq` answers "is this literally the same node"; `Tree::id`
//! answers "is this logically the same node".

mod declarations;
mod expressions;
mod statements;
mod type_trees;

pub use declarations::*;
pub use expressions::*;
pub use statements::*;
pub use type_trees::*;

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use treewright_core::{Markers, NodeId};

use crate::padding::{Container, LeftPadded, RightPadded};
use crate::space::Space;
use crate::types::{ClassKind, PrimitiveKind, TypeId, TypeTable};

// ============================================================================
// Copy-on-write support
// ============================================================================

/// "Is this update a no-op" comparison used by the `with_*` methods.
///
/// Child trees compare by reference so that an unchanged subtree is never
/// walked; plain values compare by equality.
pub trait SameAs {
    fn same_as(&self, other: &Self) -> bool;
}

impl SameAs for Tree {
    fn same_as(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: SameAs> SameAs for Option<T> {
    fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same_as(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: SameAs> SameAs for Vec<T> {
    fn same_as(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.same_as(b))
    }
}

impl<T: SameAs> SameAs for RightPadded<T> {
    fn same_as(&self, other: &Self) -> bool {
        self.element.same_as(&other.element)
            && self.after == other.after
            && self.markers == other.markers
    }
}

impl<T: SameAs> SameAs for LeftPadded<T> {
    fn same_as(&self, other: &Self) -> bool {
        self.before == other.before
            && self.element.same_as(&other.element)
            && self.markers == other.markers
    }
}

impl<T: SameAs> SameAs for Container<T> {
    fn same_as(&self, other: &Self) -> bool {
        self.before == other.before
            && self.elements.same_as(&other.elements)
            && self.markers == other.markers
    }
}

impl SameAs for Arc<TypeTable> {
    fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

macro_rules! same_as_by_eq {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SameAs for $ty {
                fn same_as(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

same_as_by_eq!(
    NodeId,
    Space,
    Markers,
    String,
    PathBuf,
    bool,
    TypeId,
    ClassKind,
    PrimitiveKind,
    BinaryOperator,
    UnaryOperator,
    AssignmentOperator,
    LiteralKind,
    ModifierKind,
);

/// Generates `with_<field>` copy-on-write methods for a node struct.
macro_rules! impl_with {
    ($node:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        paste::paste! {
            impl $node {
                $(
                    #[doc = concat!("Returns this node with `", stringify!($field), "` replaced.")]
                    #[doc = ""]
                    #[doc = "Returns `self` unchanged when the new value is the same as the old one."]
                    pub fn [<with_ $field>](self: Arc<Self>, $field: $ty) -> Arc<Self> {
                        if $crate::tree::SameAs::same_as(&self.$field, &$field) {
                            return self;
                        }
                        let mut node = (*self).clone();
                        node.$field = $field;
                        Arc::new(node)
                    }
                )*
            }
        }
    };
}
pub(crate) use impl_with;

// ============================================================================
// The Tree sum type
// ============================================================================

macro_rules! define_tree {
    ($($snake:ident : $variant:ident),* $(,)?) => {
        /// Any node in the tree.
        #[derive(Debug, Clone, Serialize, Deserialize)]
        pub enum Tree {
            $($variant(Arc<$variant>),)*
        }

        /// The variant of a [`Tree`], used for cursor queries.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum TreeKind {
            $($variant,)*
        }

        impl Tree {
            pub fn kind(&self) -> TreeKind {
                match self {
                    $(Tree::$variant(_) => TreeKind::$variant,)*
                }
            }

            /// The logical identity of this node.
            pub fn id(&self) -> NodeId {
                match self {
                    $(Tree::$variant(n) => n.id,)*
                }
            }

            pub fn prefix(&self) -> &Space {
                match self {
                    $(Tree::$variant(n) => &n.prefix,)*
                }
            }

            pub fn markers(&self) -> &Markers {
                match self {
                    $(Tree::$variant(n) => &n.markers,)*
                }
            }

            pub fn with_prefix(self, prefix: Space) -> Tree {
                match self {
                    $(Tree::$variant(n) => Tree::$variant(n.with_prefix(prefix)),)*
                }
            }

            pub fn with_markers(self, markers: Markers) -> Tree {
                match self {
                    $(Tree::$variant(n) => Tree::$variant(n.with_markers(markers)),)*
                }
            }

            pub fn with_id(self, id: NodeId) -> Tree {
                match self {
                    $(Tree::$variant(n) => Tree::$variant(n.with_id(id)),)*
                }
            }

            /// Whether both trees are the same allocation.
            pub fn ptr_eq(&self, other: &Tree) -> bool {
                match (self, other) {
                    $((Tree::$variant(a), Tree::$variant(b)) => Arc::ptr_eq(a, b),)*
                    _ => false,
                }
            }

            paste::paste! {
                $(
                    #[doc = concat!("This node as a [`", stringify!($variant), "`], if it is one.")]
                    pub fn [<as_ $snake>](&self) -> Option<&Arc<$variant>> {
                        match self {
                            Tree::$variant(n) => Some(n),
                            _ => None,
                        }
                    }
                )*
            }
        }

        $(
            impl From<Arc<$variant>> for Tree {
                fn from(node: Arc<$variant>) -> Self {
                    Tree::$variant(node)
                }
            }

            impl From<$variant> for Tree {
                fn from(node: $variant) -> Self {
                    Tree::$variant(Arc::new(node))
                }
            }
        )*
    };
}

for_each_variant!(define_tree);

impl Tree {
    /// The expression or declaration type carried by this node, if any.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Tree::Identifier(n) => n.type_,
            Tree::FieldAccess(n) => n.type_,
            Tree::ArrayAccess(n) => n.type_,
            Tree::Literal(n) => n.type_,
            Tree::MethodInvocation(n) => n.type_,
            Tree::NewClass(n) => n.type_,
            Tree::Binary(n) => n.type_,
            Tree::Unary(n) => n.type_,
            Tree::Assignment(n) => n.type_,
            Tree::Ternary(n) => n.type_,
            Tree::Parentheses(n) => n.tree.element.type_id(),
            Tree::ControlParentheses(n) => n.tree.element.type_id(),
            Tree::Primitive(n) => n.type_,
            Tree::ParameterizedType(n) => n.type_,
            Tree::ArrayType(n) => n.type_,
            Tree::ClassDeclaration(n) => n.class_type,
            Tree::MethodDeclaration(n) => n.method_type,
            Tree::NamedVariable(n) => n.name.type_id(),
            Tree::VariableDeclarations(n) => n.type_expression.as_ref().and_then(Tree::type_id),
            Tree::Annotation(n) => n.annotation_type.type_id(),
            Tree::TypeParameter(n) => n.name.type_id(),
            _ => None,
        }
    }

    /// Whether this node is a statement that ends with `;` when it appears in
    /// a block or as the body of a control statement.
    pub fn needs_semicolon(&self) -> bool {
        match self {
            Tree::VariableDeclarations(_)
            | Tree::Return(_)
            | Tree::Throw(_)
            | Tree::Empty(_)
            | Tree::MethodInvocation(_)
            | Tree::NewClass(_)
            | Tree::Assignment(_)
            | Tree::Unary(_)
            | Tree::Binary(_)
            | Tree::Ternary(_)
            | Tree::Identifier(_)
            | Tree::FieldAccess(_)
            | Tree::ArrayAccess(_)
            | Tree::Literal(_)
            | Tree::Parentheses(_) => true,
            Tree::MethodDeclaration(m) => m.body.is_none(),
            _ => false,
        }
    }

    /// The simple name of a named node (identifier, field access, class,
    /// method, variable).
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            Tree::Identifier(n) => Some(&n.simple_name),
            Tree::FieldAccess(n) => n.name.element.simple_name(),
            Tree::ClassDeclaration(n) => n.name.simple_name(),
            Tree::MethodDeclaration(n) => n.name.simple_name(),
            Tree::NamedVariable(n) => n.name.simple_name(),
            Tree::MethodInvocation(n) => n.name.simple_name(),
            Tree::ParameterizedType(n) => n.clazz.simple_name(),
            _ => None,
        }
    }

    /// The dotted source name of an identifier or field-access chain
    /// (`java.util.List`), ignoring whitespace and comments.
    pub fn qualified_name(&self) -> Option<String> {
        match self {
            Tree::Identifier(n) => Some(n.simple_name.clone()),
            Tree::FieldAccess(n) => Some(format!(
                "{}.{}",
                n.target.qualified_name()?,
                n.name.element.simple_name()?
            )),
            _ => None,
        }
    }

    /// Add a search-result marker unless an identical one is present.
    pub fn with_search_result(self, description: Option<String>) -> Tree {
        let markers = self
            .markers()
            .add_if_absent(treewright_core::Marker::search_result(description));
        self.with_markers(markers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_same_value_returns_same_allocation() {
        let ident = Arc::new(Identifier::build("x"));
        let prefix = ident.prefix.clone();
        let again = Arc::clone(&ident).with_prefix(prefix);
        assert!(Arc::ptr_eq(&ident, &again));
    }

    #[test]
    fn test_with_new_value_keeps_id_and_other_fields() {
        let ident = Arc::new(Identifier::build("x"));
        let changed = Arc::clone(&ident).with_prefix(Space::single_space());
        assert!(!Arc::ptr_eq(&ident, &changed));
        assert_eq!(changed.id, ident.id);
        assert_eq!(changed.simple_name, ident.simple_name);
        assert_eq!(changed.markers, ident.markers);
        assert_eq!(ident.prefix, Space::EMPTY);
    }

    #[test]
    fn test_tree_ptr_eq_vs_id() {
        let tree = Tree::from(Identifier::build("x"));
        let copy = tree.clone();
        assert!(tree.ptr_eq(&copy));
        let renamed = copy.with_prefix(Space::single_space());
        assert!(!tree.ptr_eq(&renamed));
        assert_eq!(tree.id(), renamed.id());
    }

    #[test]
    fn test_with_search_result_is_idempotent() {
        let tree = Tree::from(Identifier::build("x"));
        let once = tree.with_search_result(None);
        let twice = once.clone().with_search_result(None);
        assert!(once.ptr_eq(&twice));
        assert_eq!(twice.markers().len(), 1);
    }

    #[test]
    fn test_qualified_name() {
        let java = Tree::from(Identifier::build("java"));
        let util = FieldAccess::build(java, Identifier::build("util"));
        let list = FieldAccess::build(Tree::from(util), Identifier::build("List"));
        assert_eq!(
            Tree::from(list).qualified_name().as_deref(),
            Some("java.util.List")
        );
    }
}
