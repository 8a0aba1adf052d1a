// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Type, method and annotation matchers.
//!
//! Each matcher is built from a pattern string (see [`crate::pattern`]) and
//! answers `matches(tree, types)` for attributed trees. Types are compared
//! by their erased names: type arguments are ignored, a generic type
//! variable stands for its first bound (or `java.lang.Object`).

mod annotations;
mod methods;
mod types;

pub use annotations::AnnotationMatcher;
pub use methods::MethodMatcher;
pub use types::TypeMatcher;

use treewright_lst::types::{JavaType, TypeId, TypeTable};

const OBJECT: &str = "java.lang.Object";

/// The name `id` is matched by, or `None` for unknown and non-value types.
pub(crate) fn erased_name(types: &TypeTable, id: TypeId) -> Option<String> {
    erased_name_at(types, id, 0)
}

fn erased_name_at(types: &TypeTable, id: TypeId, depth: usize) -> Option<String> {
    if depth > 16 {
        return None;
    }
    match types.get(id)? {
        JavaType::Unknown | JavaType::Method(_) | JavaType::Variable(_) => None,
        JavaType::GenericTypeVariable { bounds, .. } => match bounds.first() {
            Some(bound) => erased_name_at(types, *bound, depth + 1),
            None => Some(OBJECT.to_string()),
        },
        JavaType::Array { element } => {
            Some(format!("{}[]", erased_name_at(types, *element, depth + 1)?))
        }
        JavaType::Primitive(_) | JavaType::Class(_) | JavaType::Parameterized { .. } => {
            Some(types.fully_qualified_name(id))
        }
    }
}
