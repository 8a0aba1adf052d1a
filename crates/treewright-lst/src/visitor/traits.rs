// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor trait definitions.

use std::sync::Arc;

use crate::cursor::Cursor;
use crate::tree::*;

use super::dispatch;

/// Result of `pre_visit` - controls traversal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Visit the node and its children.
    #[default]
    Continue,

    /// Skip the node's `visit_*` method and its children, continue with
    /// siblings. `post_visit` is still called for this node.
    SkipChildren,

    /// Stop traversal entirely.
    ///
    /// The node is left unchanged, `post_visit` is not called, and no further
    /// node is visited. Changes already made to earlier siblings survive.
    Stop,
}

/// Macro to generate the polymorphic per-variant visit methods.
///
/// Each default implementation walks the node's children and returns the
/// rebuilt node.
macro_rules! tree_visitor_methods {
    ($($snake:ident : $variant:ident),* $(,)?) => {
        paste::paste! {
            $(
                #[doc = concat!("Visit a [`", stringify!($variant), "`] node.")]
                #[doc = ""]
                #[doc = "Return `None` to delete the node from a list or optional slot."]
                fn [<visit_ $snake>](
                    &mut self,
                    node: Arc<$variant>,
                    cursor: &mut Cursor,
                    p: &mut P,
                ) -> Option<Tree> {
                    Some(Tree::$variant(dispatch::[<walk_ $snake>](self, node, cursor, p)))
                }
            )*
        }
    };
}

/// Macro to generate the identity-preserving per-variant visit methods.
macro_rules! iso_visitor_methods {
    ($($snake:ident : $variant:ident),* $(,)?) => {
        paste::paste! {
            $(
                #[doc = concat!("Visit a [`", stringify!($variant), "`] node, returning the same node type.")]
                fn [<visit_ $snake>](
                    &mut self,
                    node: Arc<$variant>,
                    cursor: &mut Cursor,
                    p: &mut P,
                ) -> Arc<$variant>
                where
                    Self: TreeVisitor<P> + Sized,
                {
                    dispatch::[<walk_ $snake>](self, node, cursor, p)
                }
            )*
        }
    };
}

/// Macro to forward the polymorphic methods to the identity-preserving ones.
macro_rules! iso_forwarding_methods {
    ($($snake:ident : $variant:ident),* $(,)?) => {
        paste::paste! {
            $(
                fn [<visit_ $snake>](
                    &mut self,
                    node: Arc<$variant>,
                    cursor: &mut Cursor,
                    p: &mut P,
                ) -> Option<Tree> {
                    Some(Tree::$variant(IsoVisitor::[<visit_ $snake>](self, node, cursor, p)))
                }
            )*
        }
    };
}

/// A polymorphic tree visitor.
///
/// `P` is a caller-supplied parameter threaded through the traversal, for
/// example an accumulator or an execution context.
pub trait TreeVisitor<P> {
    /// Called before the node is visited.
    #[allow(unused_variables)]
    fn pre_visit(&mut self, tree: &Tree, cursor: &mut Cursor, p: &mut P) -> VisitResult {
        VisitResult::Continue
    }

    /// Called after the node and its children were visited, with the
    /// (possibly replaced) node.
    #[allow(unused_variables)]
    fn post_visit(&mut self, tree: Tree, cursor: &mut Cursor, p: &mut P) -> Option<Tree> {
        Some(tree)
    }

    /// Visit any node: push a cursor frame, run `pre_visit`, dispatch to the
    /// per-variant method, run `post_visit`, pop the frame.
    fn visit(&mut self, tree: Tree, cursor: &mut Cursor, p: &mut P) -> Option<Tree> {
        dispatch::visit_tree(self, tree, cursor, p)
    }

    /// Visit `tree` with a fresh cursor.
    fn visit_root(&mut self, tree: Tree, p: &mut P) -> Option<Tree>
    where
        Self: Sized,
    {
        let mut cursor = Cursor::new();
        self.visit(tree, &mut cursor, p)
    }

    for_each_variant!(tree_visitor_methods);
}

/// An identity-preserving visitor.
///
/// Implementors get a [`TreeVisitor`] implementation for free, so they are
/// run with [`TreeVisitor::visit_root`].
pub trait IsoVisitor<P> {
    #[allow(unused_variables)]
    fn pre_visit(&mut self, tree: &Tree, cursor: &mut Cursor, p: &mut P) -> VisitResult {
        VisitResult::Continue
    }

    /// Called after the node and its children were visited. The result must
    /// be the same variant as `tree`.
    #[allow(unused_variables)]
    fn post_visit(&mut self, tree: Tree, cursor: &mut Cursor, p: &mut P) -> Tree {
        tree
    }

    for_each_variant!(iso_visitor_methods);
}

impl<P, T: IsoVisitor<P>> TreeVisitor<P> for T {
    fn pre_visit(&mut self, tree: &Tree, cursor: &mut Cursor, p: &mut P) -> VisitResult {
        IsoVisitor::pre_visit(self, tree, cursor, p)
    }

    fn post_visit(&mut self, tree: Tree, cursor: &mut Cursor, p: &mut P) -> Option<Tree> {
        Some(IsoVisitor::post_visit(self, tree, cursor, p))
    }

    for_each_variant!(iso_forwarding_methods);
}
