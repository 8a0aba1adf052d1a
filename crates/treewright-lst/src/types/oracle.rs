// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Type-attribution queries consumed by matchers and analyses.
//!
//! The hierarchy walks here follow the same shape as a class hierarchy walk in
//! any attributed tree: start from the type itself, then its supertype chain,
//! then every interface reachable from either, keeping a visited set so a
//! malformed (cyclic) hierarchy terminates.

use std::collections::{HashSet, VecDeque};

use super::{JavaType, TypeId, TypeTable};

const OBJECT: &str = "java.lang.Object";

/// Questions a type-attributed tree can answer about its types.
pub trait TypeOracle {
    fn type_of(&self, id: TypeId) -> Option<&JavaType>;

    /// Find a class by fully-qualified name.
    fn find_class(&self, fqn: &str) -> Option<TypeId>;

    /// The declared superclass, looking through parameterization.
    fn supertype_of(&self, id: TypeId) -> Option<TypeId>;

    /// The directly implemented (or, for interfaces, extended) interfaces.
    fn interfaces_of(&self, id: TypeId) -> Vec<TypeId>;

    /// Field variables declared on the class.
    fn members_of(&self, id: TypeId) -> Vec<TypeId>;

    /// Methods and constructors declared on the class.
    fn methods_of(&self, id: TypeId) -> Vec<TypeId>;

    /// The fully-qualified name used for matching.
    fn name_of(&self, id: TypeId) -> String;

    /// Whether `id` is exactly the type named `fqn` (ignoring type arguments).
    fn is_of_exact_type(&self, id: TypeId, fqn: &str) -> bool {
        self.name_of(id) == fqn
    }

    /// `id` first, then every supertype and interface reachable from it, each
    /// once, breadth-first.
    fn supertype_closure(&self, id: TypeId) -> Vec<TypeId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            order.push(current);
            if let Some(superclass) = self.supertype_of(current) {
                queue.push_back(superclass);
            }
            queue.extend(self.interfaces_of(current));
        }
        order
    }

    /// Whether some type in the supertype closure of `id` satisfies `matches`.
    ///
    /// Every class-like type is assignable to `java.lang.Object`, whether or
    /// not the hierarchy names it.
    fn any_supertype(&self, id: TypeId, matches: &dyn Fn(&str) -> bool) -> bool {
        if self
            .supertype_closure(id)
            .iter()
            .any(|t| matches(&self.name_of(*t)))
        {
            return true;
        }
        let class_like = matches!(
            self.type_of(id),
            Some(JavaType::Class(_)) | Some(JavaType::Parameterized { .. })
        );
        class_like && matches(OBJECT)
    }

    /// Whether a value of type `id` can be assigned to the type named `fqn`.
    fn is_assignable_to(&self, fqn: &str, id: TypeId) -> bool {
        self.any_supertype(id, &|name| name == fqn)
    }
}

impl TypeOracle for TypeTable {
    fn type_of(&self, id: TypeId) -> Option<&JavaType> {
        self.get(id)
    }

    fn find_class(&self, fqn: &str) -> Option<TypeId> {
        self.lookup(fqn).filter(|id| self.class(*id).is_some())
    }

    fn supertype_of(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id)? {
            JavaType::Class(c) => c.supertype,
            JavaType::Parameterized { base, .. } => self.class(*base)?.supertype,
            JavaType::GenericTypeVariable { bounds, .. } => bounds.first().copied(),
            _ => None,
        }
    }

    fn interfaces_of(&self, id: TypeId) -> Vec<TypeId> {
        self.class(id)
            .map(|c| c.interfaces.clone())
            .unwrap_or_default()
    }

    fn members_of(&self, id: TypeId) -> Vec<TypeId> {
        self.class(id).map(|c| c.members.clone()).unwrap_or_default()
    }

    fn methods_of(&self, id: TypeId) -> Vec<TypeId> {
        self.class(id).map(|c| c.methods.clone()).unwrap_or_default()
    }

    fn name_of(&self, id: TypeId) -> String {
        self.fully_qualified_name(id)
    }
}
