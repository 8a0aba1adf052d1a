// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor infrastructure for tree traversal and transformation.
//!
//! # Traversal Order
//!
//! - `pre_visit` is called on every node before anything else
//! - the per-variant `visit_*` method runs next; its default walks the
//!   children in source order and rebuilds the node from the results
//! - `post_visit` is called last, and sees the already-transformed children
//!
//! A [`Cursor`](crate::cursor::Cursor) frame is pushed for the node before
//! `pre_visit` and popped after `post_visit`.
//!
//! # Control Flow
//!
//! - `VisitResult::Continue`: visit the node and its children
//! - `VisitResult::SkipChildren`: skip `visit_*` and the children, but still
//!   call `post_visit`
//! - `VisitResult::Stop`: leave this node unchanged and stop the traversal
//!
//! # Two Modes
//!
//! [`TreeVisitor`] is polymorphic: every method returns `Option<Tree>`, so a
//! node may be replaced by a node of another variant or deleted (`None`)
//! from a list or optional slot. A deletion in a mandatory slot is ignored
//! and the original child kept.
//!
//! [`IsoVisitor`] is identity-preserving: each `visit_*` method takes and
//! returns the same node type. Every `IsoVisitor` is also a `TreeVisitor`.
//!
//! ```
//! use std::sync::Arc;
//! use treewright_lst::cursor::Cursor;
//! use treewright_lst::parser::JavaParser;
//! use treewright_lst::visitor::{IsoVisitor, TreeVisitor};
//! use treewright_lst::{Codegen, Identifier, Tree};
//!
//! struct Rename;
//!
//! impl IsoVisitor<()> for Rename {
//!     fn visit_identifier(
//!         &mut self,
//!         node: Arc<Identifier>,
//!         _cursor: &mut Cursor,
//!         _p: &mut (),
//!     ) -> Arc<Identifier> {
//!         if node.simple_name == "a" {
//!             node.with_simple_name("b".to_string())
//!         } else {
//!             node
//!         }
//!     }
//! }
//!
//! let units = JavaParser::new().parse(&[("A.java", "class A { int a; }")]).unwrap();
//! let tree = Rename.visit_root(Tree::from(units[0].clone()), &mut ()).unwrap();
//! assert_eq!(tree.print(), "class A { int b; }");
//! ```

mod dispatch;
mod traits;

pub use dispatch::*;
pub use traits::{IsoVisitor, TreeVisitor, VisitResult};

use crate::cursor::Cursor;
use crate::tree::Tree;

/// Collect every node in `tree` for which `select` returns a value, in
/// traversal order.
pub fn collect<T>(tree: &Tree, select: impl FnMut(&Tree, &Cursor) -> Option<T>) -> Vec<T> {
    struct Collector<F> {
        select: F,
    }

    impl<T, F: FnMut(&Tree, &Cursor) -> Option<T>> TreeVisitor<Vec<T>> for Collector<F> {
        fn pre_visit(&mut self, tree: &Tree, cursor: &mut Cursor, found: &mut Vec<T>) -> VisitResult {
            found.extend((self.select)(tree, cursor));
            VisitResult::Continue
        }
    }

    let mut found = Vec::new();
    Collector { select }.visit_root(tree.clone(), &mut found);
    found
}

/// Every node in `tree` of the given kind, in traversal order.
pub fn find_all(tree: &Tree, kind: crate::tree::TreeKind) -> Vec<Tree> {
    collect(tree, |t, _| (t.kind() == kind).then(|| t.clone()))
}
