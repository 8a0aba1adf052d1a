// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use tracing::debug;
use treewright_lst::types::{MethodType, TypeId, TypeOracle, TypeTable};
use treewright_lst::{ClassDeclaration, MethodDeclaration, MethodInvocation, NewClass, Tree};

use super::erased_name;
use crate::error::PatternError;
use crate::pattern::{glob_match, parse_method_pattern, MethodPattern};

/// Matches method invocations, constructor calls and method declarations
/// against a pattern such as `java.util.List add(..)`.
///
/// The declaring type must match exactly. With `match_overrides`, a method
/// also matches when it overrides (same name and arity) a method on one of
/// its declaring type's actual supertypes or interfaces that matches the
/// whole pattern.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    pattern: String,
    parsed: MethodPattern,
    match_overrides: bool,
}

impl MethodMatcher {
    pub fn new(pattern: &str, match_overrides: bool) -> Result<Self, PatternError> {
        let parsed = parse_method_pattern(pattern)?;
        debug!(pattern, match_overrides, "built method matcher");
        Ok(Self {
            pattern: pattern.trim().to_string(),
            parsed,
            match_overrides,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn match_overrides(&self) -> bool {
        self.match_overrides
    }

    pub fn matches_method_type(&self, types: &TypeTable, id: TypeId) -> bool {
        let Some(method) = types.method(id) else {
            return false;
        };
        let Some(parameters) = parameter_names(types, &method.parameter_types) else {
            return false;
        };
        self.matches_signature(
            types,
            method.declaring_type,
            &method.name,
            method.is_constructor,
            &parameters,
        )
    }

    pub fn matches_invocation(&self, invocation: &MethodInvocation, types: &TypeTable) -> bool {
        invocation
            .method_type
            .is_some_and(|m| self.matches_method_type(types, m))
    }

    pub fn matches_new_class(&self, new_class: &NewClass, types: &TypeTable) -> bool {
        new_class
            .constructor_type
            .is_some_and(|m| self.matches_method_type(types, m))
    }

    /// Match a declaration inside `enclosing`.
    ///
    /// When the declaration carries no method type, the enclosing class and
    /// the declared parameter types are used instead.
    pub fn matches_declaration(
        &self,
        declaration: &MethodDeclaration,
        enclosing: &ClassDeclaration,
        types: &TypeTable,
    ) -> bool {
        if let Some(method) = declaration.method_type {
            return self.matches_method_type(types, method);
        }
        let Some(declaring) = enclosing.class_type else {
            return false;
        };
        let declared: Option<Vec<TypeId>> = declaration
            .parameters
            .real_elements()
            .map(|p| p.type_id())
            .collect();
        let Some(parameters) = declared.and_then(|d| parameter_names(types, &d)) else {
            return false;
        };
        let name = if declaration.is_constructor() {
            MethodType::CONSTRUCTOR_NAME
        } else {
            declaration.simple_name()
        };
        self.matches_signature(
            types,
            declaring,
            name,
            declaration.is_constructor(),
            &parameters,
        )
    }

    /// Match an invocation, constructor call or declaration. A declaration
    /// needs its method type here; use
    /// [`matches_declaration`](Self::matches_declaration) when the
    /// enclosing class is at hand.
    pub fn matches(&self, tree: &Tree, types: &TypeTable) -> bool {
        match tree {
            Tree::MethodInvocation(invocation) => self.matches_invocation(invocation, types),
            Tree::NewClass(new_class) => self.matches_new_class(new_class, types),
            Tree::MethodDeclaration(declaration) => declaration
                .method_type
                .is_some_and(|m| self.matches_method_type(types, m)),
            _ => false,
        }
    }

    fn matches_name(&self, name: &str, is_constructor: bool) -> bool {
        if self.parsed.name == MethodType::CONSTRUCTOR_NAME {
            return is_constructor;
        }
        glob_match(&self.parsed.name, name)
    }

    fn matches_signature(
        &self,
        types: &TypeTable,
        declaring: TypeId,
        name: &str,
        is_constructor: bool,
        parameters: &[String],
    ) -> bool {
        if !self.matches_name(name, is_constructor) {
            return false;
        }
        if self.parsed.matches_parameters(parameters) && self.matches_declaring_type(types, declaring)
        {
            return true;
        }
        self.match_overrides
            && !is_constructor
            && self.overrides_match(types, declaring, name, parameters.len())
    }

    fn matches_declaring_type(&self, types: &TypeTable, declaring: TypeId) -> bool {
        erased_name(types, declaring).is_some_and(|n| self.parsed.declaring_type.matches_name(&n))
    }

    /// Walk the real supertype/interface closure of `declaring` looking for
    /// an overridden method that matches the whole pattern. Overrides are
    /// found by name and arity because covariant overrides may change the
    /// parameter and return types.
    fn overrides_match(
        &self,
        types: &TypeTable,
        declaring: TypeId,
        name: &str,
        arity: usize,
    ) -> bool {
        types
            .supertype_closure(declaring)
            .into_iter()
            .skip(1)
            .filter(|ancestor| self.matches_declaring_type(types, *ancestor))
            .flat_map(|ancestor| types.methods_of(ancestor))
            .filter_map(|m| types.method(m))
            .filter(|m| !m.is_constructor && m.name == name && m.parameter_types.len() == arity)
            .any(|m| {
                parameter_names(types, &m.parameter_types)
                    .is_some_and(|params| self.parsed.matches_parameters(&params))
            })
    }
}

/// Erased parameter type names; `None` if any parameter type is unknown.
fn parameter_names(types: &TypeTable, parameters: &[TypeId]) -> Option<Vec<String>> {
    parameters.iter().map(|p| erased_name(types, *p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use treewright_lst::types::{ClassKind, PrimitiveKind, TypeTableBuilder};

    struct Fixture {
        types: TypeTable,
        add_one: TypeId,
        add_two: TypeId,
        size: TypeId,
        array_list_add: TypeId,
    }

    fn method(declaring: TypeId, name: &str, parameter_types: Vec<TypeId>) -> MethodType {
        MethodType {
            declaring_type: declaring,
            name: name.to_string(),
            return_type: None,
            parameter_names: (0..parameter_types.len()).map(|i| format!("p{}", i)).collect(),
            parameter_types,
            is_constructor: false,
        }
    }

    fn fixture() -> Fixture {
        let mut b = TypeTableBuilder::new();
        let object = b.reserve_class("java.lang.Object", ClassKind::Class);
        let list = b.reserve_class("java.util.List", ClassKind::Interface);
        let array_list = b.reserve_class("java.util.ArrayList", ClassKind::Class);
        let e = b.generic(list, "E", vec![]);
        let int = b.primitive(PrimitiveKind::Int);
        let add_one = b.method_type(method(list, "add", vec![e]));
        let add_two = b.method_type(method(list, "add", vec![int, e]));
        let size = b.method_type(method(list, "size", vec![]));
        let array_list_add = b.method_type(method(array_list, "add", vec![object]));
        b.class_mut(list).unwrap().methods = vec![add_one, add_two, size];
        b.class_mut(array_list).unwrap().interfaces.push(list);
        b.class_mut(array_list).unwrap().methods.push(array_list_add);
        Fixture {
            types: b.build(),
            add_one,
            add_two,
            size,
            array_list_add,
        }
    }

    #[test]
    fn test_any_params_matches_every_arity() {
        let f = fixture();
        let m = MethodMatcher::new("java.util.List add(..)", false).unwrap();
        assert!(m.matches_method_type(&f.types, f.add_one));
        assert!(m.matches_method_type(&f.types, f.add_two));
        assert!(!m.matches_method_type(&f.types, f.size));
    }

    #[test]
    fn test_empty_params_matches_only_no_params() {
        let f = fixture();
        let m = MethodMatcher::new("java.util.List add()", false).unwrap();
        assert!(!m.matches_method_type(&f.types, f.add_one));
        assert!(!m.matches_method_type(&f.types, f.add_two));
        let size = MethodMatcher::new("java.util.List size()", false).unwrap();
        assert!(size.matches_method_type(&f.types, f.size));
    }

    #[test]
    fn test_generic_parameter_erases_to_object() {
        let f = fixture();
        let m = MethodMatcher::new("java.util.List add(int, java.lang.Object)", false).unwrap();
        assert!(m.matches_method_type(&f.types, f.add_two));
        let star = MethodMatcher::new("java.util.List add(*)", false).unwrap();
        assert!(star.matches_method_type(&f.types, f.add_one));
        assert!(!star.matches_method_type(&f.types, f.add_two));
    }

    #[test]
    fn test_overrides_follow_real_interfaces() {
        let f = fixture();
        let exact = MethodMatcher::new("java.util.List add(..)", false).unwrap();
        assert!(!exact.matches_method_type(&f.types, f.array_list_add));

        let overrides = MethodMatcher::new("java.util.List add(..)", true).unwrap();
        assert!(overrides.matches_method_type(&f.types, f.array_list_add));

        let unrelated = MethodMatcher::new("java.util.Map add(..)", true).unwrap();
        assert!(!unrelated.matches_method_type(&f.types, f.array_list_add));
    }

    #[test]
    fn test_name_globs() {
        let f = fixture();
        let m = MethodMatcher::new("java.util.List#a*(..)", false).unwrap();
        assert!(m.matches_method_type(&f.types, f.add_one));
        assert!(!m.matches_method_type(&f.types, f.size));
    }
}
