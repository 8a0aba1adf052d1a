// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use tracing::debug;
use treewright_lst::types::{TypeId, TypeOracle, TypeTable};
use treewright_lst::Tree;

use super::erased_name;
use crate::error::PatternError;
use crate::pattern::{parse_type_pattern, TypePattern};

/// Matches types against a type pattern such as `java.util..*`.
#[derive(Debug, Clone)]
pub struct TypeMatcher {
    pattern: String,
    parsed: TypePattern,
    include_subtypes: bool,
}

impl TypeMatcher {
    /// With `include_subtypes`, a type also matches when any type in its
    /// supertype/interface closure matches.
    pub fn new(pattern: &str, include_subtypes: bool) -> Result<Self, PatternError> {
        let parsed = parse_type_pattern(pattern)?;
        debug!(pattern, include_subtypes, "built type matcher");
        Ok(Self {
            pattern: pattern.trim().to_string(),
            parsed,
            include_subtypes,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn include_subtypes(&self) -> bool {
        self.include_subtypes
    }

    pub(crate) fn parsed(&self) -> &TypePattern {
        &self.parsed
    }

    /// Match a fully-qualified type name, without hierarchy information.
    pub fn matches_name(&self, fqn: &str) -> bool {
        self.parsed.matches_name(fqn)
    }

    pub fn matches_type(&self, types: &TypeTable, id: TypeId) -> bool {
        let Some(name) = erased_name(types, id) else {
            return false;
        };
        if self.parsed.matches_name(&name) {
            return true;
        }
        self.include_subtypes && types.any_supertype(id, &|n: &str| self.parsed.matches_name(n))
    }

    /// Whether the type of `tree` matches. Method declarations never match:
    /// their type is a signature, not a value type.
    pub fn matches(&self, tree: &Tree, types: &TypeTable) -> bool {
        if matches!(tree, Tree::MethodDeclaration(_)) {
            return false;
        }
        tree.type_id().is_some_and(|id| self.matches_type(types, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treewright_lst::types::{ClassKind, TypeTableBuilder};

    fn table() -> (TypeTable, TypeId, TypeId, TypeId) {
        let mut b = TypeTableBuilder::new();
        let collection = b.reserve_class("java.util.Collection", ClassKind::Interface);
        let list = b.reserve_class("java.util.List", ClassKind::Interface);
        let array_list = b.reserve_class("java.util.ArrayList", ClassKind::Class);
        let future = b.reserve_class("java.util.concurrent.Future", ClassKind::Interface);
        b.class_mut(list).unwrap().interfaces.push(collection);
        b.class_mut(array_list).unwrap().interfaces.push(list);
        (b.build(), list, array_list, future)
    }

    #[test]
    fn test_package_wildcards() {
        let (types, list, _, future) = table();

        let direct = TypeMatcher::new("java.util.*", false).unwrap();
        assert!(direct.matches_type(&types, list));
        assert!(!direct.matches_type(&types, future));

        let deep = TypeMatcher::new("java.util..*", false).unwrap();
        assert!(deep.matches_type(&types, list));
        assert!(deep.matches_type(&types, future));
    }

    #[test]
    fn test_exact_and_subtypes() {
        let (types, list, array_list, future) = table();

        let exact = TypeMatcher::new("java.util.List", false).unwrap();
        assert!(exact.matches_type(&types, list));
        assert!(!exact.matches_type(&types, array_list));

        let subtypes = TypeMatcher::new("java.util.Collection", true).unwrap();
        assert!(subtypes.matches_type(&types, array_list));
        assert!(!subtypes.matches_type(&types, future));
    }
}
