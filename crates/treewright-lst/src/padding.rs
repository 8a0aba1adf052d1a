// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Padding wrappers: formatting attached to a child slot rather than to the
//! child itself.
//!
//! - [`RightPadded`]: element followed by the space before its delimiter
//!   (`a` + ` ` in `a ,`)
//! - [`LeftPadded`]: the space before an element, then the element
//!   (` ` + `= 1` in `x = 1`)
//! - [`Container`]: the space before an opening delimiter, then a list of
//!   right-padded elements (`(a, b)`)
//!
//! Replacing the element of a padding wrapper keeps its padding, so callers can
//! swap a child without knowing how its siblings are formatted.

use serde::{Deserialize, Serialize};
use tracing::debug;
use treewright_core::{Markers, NodeId};

use crate::space::Space;
use crate::tree::Tree;

/// An element followed by the whitespace before its closing delimiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RightPadded<T> {
    pub element: T,
    pub after: Space,
    pub markers: Markers,
}

impl<T> RightPadded<T> {
    pub fn new(element: T, after: Space) -> Self {
        Self {
            element,
            after,
            markers: Markers::new(),
        }
    }

    /// Wrap `element` with no trailing space.
    pub fn build(element: T) -> Self {
        Self::new(element, Space::EMPTY)
    }

    pub fn with_element(self, element: T) -> Self {
        Self { element, ..self }
    }

    pub fn with_after(self, after: Space) -> Self {
        Self { after, ..self }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RightPadded<U> {
        RightPadded {
            element: f(self.element),
            after: self.after,
            markers: self.markers,
        }
    }
}

/// The whitespace before an element, then the element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeftPadded<T> {
    pub before: Space,
    pub element: T,
    pub markers: Markers,
}

impl<T> LeftPadded<T> {
    pub fn new(before: Space, element: T) -> Self {
        Self {
            before,
            element,
            markers: Markers::new(),
        }
    }

    /// Wrap `element` with no leading space.
    pub fn build(element: T) -> Self {
        Self::new(Space::EMPTY, element)
    }

    pub fn with_element(self, element: T) -> Self {
        Self { element, ..self }
    }

    pub fn with_before(self, before: Space) -> Self {
        Self { before, ..self }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LeftPadded<U> {
        LeftPadded {
            before: self.before,
            element: f(self.element),
            markers: self.markers,
        }
    }
}

/// A delimited list: the space before the opening delimiter and the
/// right-padded elements. The last element's `after` is the space before the
/// closing delimiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container<T> {
    pub before: Space,
    pub elements: Vec<RightPadded<T>>,
    pub markers: Markers,
}

impl<T> Container<T> {
    pub fn new(before: Space, elements: Vec<RightPadded<T>>) -> Self {
        Self {
            before,
            elements,
            markers: Markers::new(),
        }
    }

    /// An empty container with no leading space.
    pub fn empty() -> Self {
        Self::new(Space::EMPTY, Vec::new())
    }

    pub fn with_before(self, before: Space) -> Self {
        Self { before, ..self }
    }

    /// Replace the padded elements wholesale.
    pub fn with_padded_elements(self, elements: Vec<RightPadded<T>>) -> Self {
        Self { elements, ..self }
    }

    /// The elements without their padding.
    pub fn elements(&self) -> impl Iterator<Item = &T> {
        self.elements.iter().map(|rp| &rp.element)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Container<Tree> {
    /// The elements, ignoring the `Empty` placeholder that keeps the space
    /// inside an empty `( )`.
    pub fn real_elements(&self) -> impl Iterator<Item = &Tree> {
        self.elements
            .iter()
            .map(|rp| &rp.element)
            .filter(|t| !matches!(t, Tree::Empty(_)))
    }

    /// Replace the elements, keeping the padding of every surviving element.
    ///
    /// A new element takes over the padding of the old element with the same
    /// node id; failing that, the padding of the old element at the same
    /// position. Only elements past the end of the old list get synthesized
    /// formatting: an empty `after`, and when the element has no prefix of
    /// its own, an empty prefix for the first element or the previous
    /// element's whitespace (a single space if it has none) for later ones.
    pub fn with_elements(self, elements: Vec<Tree>) -> Self {
        let old: Vec<RightPadded<Tree>> = self
            .elements
            .iter()
            .filter(|rp| !matches!(rp.element, Tree::Empty(_)))
            .cloned()
            .collect();

        if elements.is_empty() && old.is_empty() {
            return self;
        }

        let old_ids: Vec<NodeId> = old.iter().map(|rp| rp.element.id()).collect();
        let mut padded: Vec<RightPadded<Tree>> = Vec::with_capacity(elements.len());
        for (i, element) in elements.into_iter().enumerate() {
            let matched = old_ids
                .iter()
                .position(|id| *id == element.id())
                .or(if i < old.len() { Some(i) } else { None });
            match matched {
                Some(pos) => padded.push(old[pos].clone().with_element(element)),
                None => {
                    let element = if element.prefix().is_empty() && i > 0 {
                        let previous = padded[i - 1].element.prefix();
                        let prefix = if previous.is_whitespace_only() && !previous.is_empty() {
                            previous.clone()
                        } else {
                            Space::single_space()
                        };
                        debug!(index = i, prefix = ?prefix.whitespace(), "synthesized list element prefix");
                        element.with_prefix(prefix)
                    } else {
                        element
                    };
                    padded.push(RightPadded::build(element));
                }
            }
        }

        Self {
            elements: padded,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Identifier;

    fn ident(name: &str, prefix: &str) -> Tree {
        Tree::from(Identifier::build(name)).with_prefix(Space::build(prefix))
    }

    #[test]
    fn test_real_elements_skips_placeholder() {
        let container = Container::new(
            Space::EMPTY,
            vec![RightPadded::build(Tree::from(crate::tree::Empty::new(
                Space::single_space(),
            )))],
        );
        assert_eq!(container.real_elements().count(), 0);
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_with_elements_preserves_surviving_padding() {
        let a = ident("a", "");
        let b = ident("b", " ");
        let container = Container::new(
            Space::EMPTY,
            vec![
                RightPadded::new(a.clone(), Space::build(" ")),
                RightPadded::new(b.clone(), Space::build("  ")),
            ],
        );
        // Reverse the order: padding travels with the node id.
        let swapped = container.with_elements(vec![b.clone(), a.clone()]);
        assert_eq!(swapped.elements[0].element.id(), b.id());
        assert_eq!(swapped.elements[0].after, Space::build("  "));
        assert_eq!(swapped.elements[1].after, Space::build(" "));
    }

    #[test]
    fn test_with_elements_synthesizes_for_new_elements() {
        let container: Container<Tree> = Container::empty();
        let filled = container.with_elements(vec![ident("x", ""), ident("y", "")]);
        assert_eq!(filled.elements[0].element.prefix(), &Space::EMPTY);
        assert_eq!(filled.elements[1].element.prefix(), &Space::single_space());
        assert!(filled.elements.iter().all(|rp| rp.after.is_empty()));
    }

    #[test]
    fn test_with_elements_copies_previous_whitespace() {
        let container = Container::new(
            Space::EMPTY,
            vec![
                RightPadded::build(ident("a", "")),
                RightPadded::build(ident("b", "\n    ")),
            ],
        );
        let mut elements: Vec<Tree> = container.elements().cloned().collect();
        elements.push(ident("c", ""));
        let grown = container.with_elements(elements);
        assert_eq!(grown.elements[2].element.prefix(), &Space::build("\n    "));
    }
}
