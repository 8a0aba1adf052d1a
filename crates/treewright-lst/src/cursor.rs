// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The traversal cursor: the path from the root to the node being visited,
//! plus per-frame message maps.
//!
//! A fresh [`Cursor`] is created for every traversal. The visitor engine
//! pushes a frame before visiting a node and pops it afterwards, discarding
//! any messages stored on that frame. A bottom "root" frame that holds no
//! tree lives for the whole traversal and can carry traversal-wide messages.
//!
//! Every query walks the frame stack from the top, so the cost is
//! proportional to the current depth. No index is maintained.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CursorError;
use crate::tree::{Tree, TreeKind};
use crate::types::TypeTable;

struct Frame {
    tree: Option<Tree>,
    messages: HashMap<String, Box<dyn Any>>,
}

impl Frame {
    fn new(tree: Option<Tree>) -> Self {
        Self {
            tree,
            messages: HashMap::new(),
        }
    }
}

/// Where the traversal is and what the ancestors said.
pub struct Cursor {
    frames: Vec<Frame>,
    types: Option<Arc<TypeTable>>,
    stopped: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path: Vec<TreeKind> = self.path().map(Tree::kind).collect();
        f.debug_struct("Cursor")
            .field("path", &path)
            .field("stopped", &self.stopped)
            .finish()
    }
}

impl Cursor {
    /// A cursor holding only the root frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(None)],
            types: None,
            stopped: false,
        }
    }

    pub(crate) fn push(&mut self, tree: Tree) {
        self.frames.push(Frame::new(Some(tree)));
    }

    pub(crate) fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub(crate) fn set_types(&mut self, types: Arc<TypeTable>) {
        self.types = Some(types);
    }

    /// Number of tree frames on the stack.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// The node being visited.
    pub fn value(&self) -> Option<&Tree> {
        self.frames.last().and_then(|f| f.tree.as_ref())
    }

    /// The node enclosing the one being visited.
    pub fn parent(&self) -> Option<&Tree> {
        self.path().nth(1)
    }

    /// The nodes from the one being visited up to the root.
    pub fn path(&self) -> impl Iterator<Item = &Tree> {
        self.frames.iter().rev().filter_map(|f| f.tree.as_ref())
    }

    /// The nearest node of `kind`, starting with the one being visited.
    pub fn first_enclosing(&self, kind: TreeKind) -> Option<&Tree> {
        self.path().find(|t| t.kind() == kind)
    }

    pub fn first_enclosing_or_err(&self, kind: TreeKind) -> Result<&Tree, CursorError> {
        self.first_enclosing(kind)
            .ok_or(CursorError::NoEnclosing(kind))
    }

    /// Whether any enclosing node (excluding the current one) is of `kind`.
    pub fn is_inside(&self, kind: TreeKind) -> bool {
        self.path().skip(1).any(|t| t.kind() == kind)
    }

    /// The type table of the compilation unit being visited.
    pub fn types(&self) -> Option<&Arc<TypeTable>> {
        self.types.as_ref()
    }

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    /// Store a message on the current frame.
    pub fn put_message<T: Any>(&mut self, key: impl Into<String>, value: T) {
        if let Some(frame) = self.frames.last_mut() {
            frame.messages.insert(key.into(), Box::new(value));
        }
    }

    /// Store a message on the root frame, visible for the rest of the traversal.
    pub fn put_root_message<T: Any>(&mut self, key: impl Into<String>, value: T) {
        self.frames[0].messages.insert(key.into(), Box::new(value));
    }

    /// A message stored on the current frame.
    pub fn get_message<T: Any>(&self, key: &str) -> Option<&T> {
        self.frames
            .last()
            .and_then(|f| f.messages.get(key))
            .and_then(|m| m.downcast_ref())
    }

    /// The message stored under `key` on the nearest frame carrying one,
    /// starting with the current frame.
    pub fn nearest_message<T: Any>(&self, key: &str) -> Option<&T> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.messages.get(key))
            .and_then(|m| m.downcast_ref())
    }

    pub fn nearest_message_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|f| f.messages.get_mut(key))
            .and_then(|m| m.downcast_mut())
    }

    /// Remove and return the nearest message stored under `key`.
    ///
    /// A message of a different type is left in place and `None` returned.
    pub fn poll_nearest_message<T: Any>(&mut self, key: &str) -> Option<T> {
        let frame = self
            .frames
            .iter_mut()
            .rev()
            .find(|f| f.messages.contains_key(key))?;
        let message = frame.messages.remove(key)?;
        match message.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(message) => {
                frame.messages.insert(key.to_string(), message);
                None
            }
        }
    }

    /// The message stored under `key` on the current frame, inserting
    /// `compute()` first if there is none.
    ///
    /// A message of a different type under the same key is replaced.
    pub fn compute_message_if_absent<T: Any>(
        &mut self,
        key: &str,
        compute: impl FnOnce() -> T,
    ) -> Option<&mut T> {
        let frame = self.frames.last_mut()?;
        let present = frame
            .messages
            .get(key)
            .is_some_and(|m| m.downcast_ref::<T>().is_some());
        if !present {
            frame.messages.insert(key.to_string(), Box::new(compute()));
        }
        frame.messages.get_mut(key).and_then(|m| m.downcast_mut())
    }

    /// Store a message on the frame of the nearest node of `kind`.
    ///
    /// Returns `false` when there is no such node.
    pub fn put_message_on_first_enclosing<T: Any>(
        &mut self,
        kind: TreeKind,
        key: impl Into<String>,
        value: T,
    ) -> bool {
        let frame = self
            .frames
            .iter_mut()
            .rev()
            .find(|f| f.tree.as_ref().is_some_and(|t| t.kind() == kind));
        match frame {
            Some(frame) => {
                frame.messages.insert(key.into(), Box::new(value));
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Stopping
    // ------------------------------------------------------------------

    /// Ask the engine not to visit any further nodes in this traversal.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Empty, Identifier};
    use crate::space::Space;

    fn cursor_at_depth_two() -> Cursor {
        let mut cursor = Cursor::new();
        cursor.push(Tree::from(Empty::new(Space::EMPTY)));
        cursor.push(Tree::from(Identifier::build("x")));
        cursor
    }

    #[test]
    fn test_path_and_enclosing() {
        let cursor = cursor_at_depth_two();
        assert_eq!(cursor.depth(), 2);
        assert_eq!(cursor.value().map(Tree::kind), Some(TreeKind::Identifier));
        assert_eq!(cursor.parent().map(Tree::kind), Some(TreeKind::Empty));
        assert!(cursor.first_enclosing(TreeKind::Identifier).is_some());
        assert!(cursor.is_inside(TreeKind::Empty));
        assert!(!cursor.is_inside(TreeKind::Identifier));
        assert_eq!(
            cursor.first_enclosing_or_err(TreeKind::Block).unwrap_err(),
            CursorError::NoEnclosing(TreeKind::Block)
        );
    }

    #[test]
    fn test_messages_are_scoped_to_frames() {
        let mut cursor = Cursor::new();
        cursor.push(Tree::from(Empty::new(Space::EMPTY)));
        cursor.put_message("k", 1_u32);
        cursor.push(Tree::from(Identifier::build("x")));
        assert_eq!(cursor.get_message::<u32>("k"), None);
        assert_eq!(cursor.nearest_message::<u32>("k"), Some(&1));
        cursor.put_message("k", 2_u32);
        assert_eq!(cursor.nearest_message::<u32>("k"), Some(&2));
        cursor.pop();
        assert_eq!(cursor.nearest_message::<u32>("k"), Some(&1));
        cursor.pop();
        assert_eq!(cursor.nearest_message::<u32>("k"), None);
    }

    #[test]
    fn test_poll_removes_message() {
        let mut cursor = cursor_at_depth_two();
        assert!(cursor.put_message_on_first_enclosing(TreeKind::Empty, "seen", String::from("y")));
        assert_eq!(cursor.poll_nearest_message::<u32>("seen"), None);
        assert_eq!(
            cursor.poll_nearest_message::<String>("seen").as_deref(),
            Some("y")
        );
        assert_eq!(cursor.nearest_message::<String>("seen"), None);
    }

    #[test]
    fn test_compute_message_if_absent() {
        let mut cursor = cursor_at_depth_two();
        if let Some(list) = cursor.compute_message_if_absent("list", Vec::<u32>::new) {
            list.push(1);
        }
        if let Some(list) = cursor.compute_message_if_absent("list", Vec::<u32>::new) {
            list.push(2);
        }
        assert_eq!(cursor.get_message::<Vec<u32>>("list"), Some(&vec![1, 2]));
    }
}
