// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Type expressions: primitives, parameterized types and arrays.
//!
//! Class types written as names are plain `Identifier` or `FieldAccess`
//! nodes whose `type_` carries the resolved class.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use treewright_core::{Markers, NodeId};

use super::{impl_with, Tree};
use crate::padding::{Container, LeftPadded};
use crate::space::Space;
use crate::types::{PrimitiveKind, TypeId};

/// `int`, `boolean`, `void`, ...
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Primitive {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub kind: PrimitiveKind,
    pub type_: Option<TypeId>,
}

impl_with!(Primitive {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    kind: PrimitiveKind,
    type_: Option<TypeId>,
});

/// `List<String>`, `Map<K, V>`, or the diamond `ArrayList<>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterizedType {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub clazz: Tree,
    /// `before` is the space before `<`; a diamond holds a single `Empty`.
    pub type_parameters: Option<Container<Tree>>,
    pub type_: Option<TypeId>,
}

impl_with!(ParameterizedType {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    clazz: Tree,
    type_parameters: Option<Container<Tree>>,
    type_: Option<TypeId>,
});

/// `T[]`. Multi-dimensional arrays nest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayType {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub element_type: Tree,
    /// `before` is the space before `[`; the element is the space before `]`.
    pub dimension: LeftPadded<Space>,
    pub type_: Option<TypeId>,
}

impl_with!(ArrayType {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    element_type: Tree,
    dimension: LeftPadded<Space>,
    type_: Option<TypeId>,
});
