// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Type attribution for parsed compilation units.
//!
//! Three passes over all units, sharing one [`TypeTableBuilder`]:
//!
//! 1. Reserve a class handle for every declared class (nested classes are
//!    `Outer$Inner`) along with its type parameters.
//! 2. Resolve class headers and declare fields, methods and constructors.
//! 3. Walk every unit with a visitor that fills in expression types, method
//!    types and variable handles, resolving names through local scopes,
//!    enclosing classes, imports, the unit's package and the default imports.
//!
//! Names that do not resolve are left without a type. Nothing here fails.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, trace};
use treewright_core::NodeId;

use super::ParserOptions;
use crate::cursor::Cursor;
use crate::padding::Container;
use crate::tree::*;
use crate::types::{
    ClassKind, JavaType, MethodType, PrimitiveKind, TypeId, TypeTableBuilder, VariableType,
};
use crate::visitor::{
    visit_container, visit_list, visit_optional, visit_optional_container, visit_required,
    visit_required_left_padded, visit_required_right_padded, walk_assignment, walk_binary,
    walk_block, walk_literal, walk_ternary, walk_unary, TreeVisitor,
};

const OBJECT: &str = "java.lang.Object";
const STRING: &str = "java.lang.String";

/// Attribute `units` together and give every unit the finished table.
pub(super) fn attribute(
    units: Vec<CompilationUnit>,
    options: &ParserOptions,
) -> Vec<CompilationUnit> {
    let mut builder = TypeTableBuilder::new();
    let mut declarations = Declarations::default();

    let scopes: Vec<UnitScope> = units
        .iter()
        .map(|unit| UnitScope::new(unit, options))
        .collect();

    for (unit, scope) in units.iter().zip(&scopes) {
        for class in &unit.classes {
            if let Some(class) = class.as_class_declaration() {
                declarations.reserve(&mut builder, class, &scope.package, None);
            }
        }
    }

    for (unit, scope) in units.iter().zip(&scopes) {
        let mut type_scope = TypeScope::default();
        for class in &unit.classes {
            if let Some(class) = class.as_class_declaration() {
                declarations.declare(&mut builder, scope, &mut type_scope, class);
            }
        }
    }

    let mut attributed = Vec::with_capacity(units.len());
    for (unit, scope) in units.into_iter().zip(&scopes) {
        let mut attributor = Attributor {
            builder: &mut builder,
            declarations: &declarations,
            unit: scope,
            type_scope: TypeScope::default(),
            locals: Vec::new(),
            methods: Vec::new(),
        };
        let tree = attributor.visit_root(Tree::from(unit.clone()), &mut ());
        let unit = match tree.as_ref().and_then(Tree::as_compilation_unit) {
            Some(attributed) => (**attributed).clone(),
            None => unit,
        };
        attributed.push(unit);
    }

    let table = Arc::new(builder.build());
    debug!(types = table.len(), "built type table");
    attributed
        .into_iter()
        .map(|mut unit| {
            unit.types = Arc::clone(&table);
            unit
        })
        .collect()
}

// ============================================================================
// Name resolution
// ============================================================================

/// What a compilation unit can see without qualification.
struct UnitScope {
    package: String,
    /// Simple name to fully-qualified name for single-type imports.
    single: HashMap<String, String>,
    /// Packages imported on demand, followed by the default imports.
    on_demand: Vec<String>,
}

impl UnitScope {
    fn new(unit: &CompilationUnit, options: &ParserOptions) -> Self {
        let mut single = HashMap::new();
        let mut on_demand = Vec::new();
        for import in unit.imports.iter().filter_map(|rp| rp.element.as_import()) {
            if import.is_static.element {
                continue;
            }
            if import.is_wildcard() {
                on_demand.push(import.package_name());
            } else {
                let name = import.type_name();
                let simple = name.rsplit('.').next().unwrap_or(&name).to_string();
                single.insert(simple, name);
            }
        }
        on_demand.extend(options.default_package_imports.iter().cloned());
        Self {
            package: unit.package_name(),
            single,
            on_demand,
        }
    }
}

/// Enclosing classes and type parameters at a point in the source.
#[derive(Default)]
struct TypeScope {
    classes: Vec<TypeId>,
    type_parameters: Vec<HashMap<String, TypeId>>,
}

fn class_lookup(builder: &TypeTableBuilder, fqn: &str) -> Option<TypeId> {
    let id = builder.lookup(fqn)?;
    matches!(builder.get(id), Some(JavaType::Class(_))).then_some(id)
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", package, name)
    }
}

fn resolve_simple(
    builder: &TypeTableBuilder,
    unit: &UnitScope,
    scope: &TypeScope,
    name: &str,
) -> Option<TypeId> {
    for parameters in scope.type_parameters.iter().rev() {
        if let Some(id) = parameters.get(name) {
            return Some(*id);
        }
    }
    for class in scope.classes.iter().rev() {
        let Some(fqn) = builder.class(*class).map(|c| c.fqn.clone()) else {
            continue;
        };
        if let Some(id) = class_lookup(builder, &format!("{}${}", fqn, name)) {
            return Some(id);
        }
        if fqn.rsplit(['.', '$']).next() == Some(name) {
            return Some(*class);
        }
    }
    if let Some(fqn) = unit.single.get(name) {
        return class_lookup(builder, fqn);
    }
    if let Some(id) = class_lookup(builder, &qualify(&unit.package, name)) {
        return Some(id);
    }
    unit.on_demand
        .iter()
        .find_map(|package| class_lookup(builder, &qualify(package, name)))
}

/// Resolve a simple or dotted type name (`List`, `java.util.List`,
/// `Map.Entry`).
fn resolve_name(
    builder: &TypeTableBuilder,
    unit: &UnitScope,
    scope: &TypeScope,
    name: &str,
) -> Option<TypeId> {
    if !name.contains('.') {
        return resolve_simple(builder, unit, scope, name);
    }
    let segments: Vec<&str> = name.split('.').collect();
    for split in (1..=segments.len()).rev() {
        let head = segments[..split].join(".");
        let base = if split == 1 {
            resolve_simple(builder, unit, scope, &head)
        } else {
            class_lookup(builder, &head)
        };
        let Some(base) = base else {
            continue;
        };
        let nested = &segments[split..];
        if nested.is_empty() {
            return Some(base);
        }
        let fqn = builder.class(base)?.fqn.clone();
        return class_lookup(builder, &format!("{}${}", fqn, nested.join("$")));
    }
    None
}

/// Resolve a type tree without rewriting it.
fn resolve_type_tree(
    builder: &mut TypeTableBuilder,
    unit: &UnitScope,
    scope: &TypeScope,
    tree: &Tree,
) -> Option<TypeId> {
    match tree {
        Tree::Primitive(n) => Some(builder.primitive(n.kind)),
        Tree::Identifier(_) | Tree::FieldAccess(_) => {
            resolve_name(builder, unit, scope, &tree.qualified_name()?)
        }
        Tree::ParameterizedType(n) => {
            let base = resolve_type_tree(builder, unit, scope, &n.clazz)?;
            let arguments: Option<Vec<TypeId>> = n
                .type_parameters
                .iter()
                .flat_map(|c| c.real_elements())
                .map(|t| resolve_type_tree(builder, unit, scope, t))
                .collect();
            match arguments {
                Some(arguments) if !arguments.is_empty() => {
                    Some(builder.parameterized(base, arguments))
                }
                _ => Some(base),
            }
        }
        Tree::ArrayType(n) => {
            let element = resolve_type_tree(builder, unit, scope, &n.element_type)?;
            Some(builder.array_of(element))
        }
        _ => None,
    }
}

// ============================================================================
// Declarations (passes 1 and 2)
// ============================================================================

/// Handles assigned to declarations, keyed by the declaring node's id.
#[derive(Default)]
struct Declarations {
    classes: HashMap<NodeId, TypeId>,
    methods: HashMap<NodeId, TypeId>,
    fields: HashMap<NodeId, TypeId>,
    /// Type parameters declared by a class or method node.
    type_parameters: HashMap<NodeId, HashMap<String, TypeId>>,
}

fn type_parameter_names(parameters: &Option<Container<Tree>>) -> Vec<(String, Option<Container<Tree>>)> {
    parameters
        .iter()
        .flat_map(|c| c.real_elements())
        .filter_map(|t| t.as_type_parameter())
        .map(|tp| {
            (
                tp.name.simple_name().unwrap_or_default().to_string(),
                tp.bounds.clone(),
            )
        })
        .collect()
}

fn class_members(class: &ClassDeclaration) -> Vec<Tree> {
    class
        .body
        .as_block()
        .map(|b| b.statement_trees().cloned().collect())
        .unwrap_or_default()
}

impl Declarations {
    fn reserve(
        &mut self,
        builder: &mut TypeTableBuilder,
        class: &ClassDeclaration,
        package: &str,
        outer: Option<TypeId>,
    ) {
        let fqn = match outer.and_then(|o| builder.class(o)) {
            Some(outer) => format!("{}${}", outer.fqn, class.simple_name()),
            None => qualify(package, class.simple_name()),
        };
        let id = builder.reserve_class(&fqn, class.kind.element);
        trace!(%fqn, "reserved class");

        let mut parameters = HashMap::new();
        let mut ids = Vec::new();
        for (name, _) in type_parameter_names(&class.type_parameters) {
            let generic = builder.generic(id, &name, Vec::new());
            parameters.insert(name, generic);
            ids.push(generic);
        }
        if let Some(c) = builder.class_mut(id) {
            c.owning_class = outer;
            c.type_parameters = ids;
        }
        self.classes.insert(class.id, id);
        self.type_parameters.insert(class.id, parameters);

        for member in class_members(class) {
            if let Some(nested) = member.as_class_declaration() {
                self.reserve(builder, nested, package, Some(id));
            }
        }
    }

    fn declare(
        &mut self,
        builder: &mut TypeTableBuilder,
        unit: &UnitScope,
        scope: &mut TypeScope,
        class: &ClassDeclaration,
    ) {
        let Some(id) = self.classes.get(&class.id).copied() else {
            return;
        };
        scope.classes.push(id);
        scope
            .type_parameters
            .push(self.type_parameters.get(&class.id).cloned().unwrap_or_default());

        for (name, bounds) in type_parameter_names(&class.type_parameters) {
            let resolved = resolve_bounds(builder, unit, scope, &bounds);
            if let Some(generic) = builder.lookup(&format!("{}#{}", fqn_of(builder, id), name)) {
                if let Some(JavaType::GenericTypeVariable { bounds, .. }) = builder.get_mut(generic) {
                    *bounds = resolved;
                }
            }
        }

        let is_object = fqn_of(builder, id) == OBJECT;
        let mut supertype = class
            .extends
            .as_ref()
            .and_then(|lp| resolve_type_tree(builder, unit, scope, &lp.element));
        if supertype.is_none()
            && !is_object
            && matches!(class.kind.element, ClassKind::Class | ClassKind::Enum)
        {
            supertype = class_lookup(builder, OBJECT);
        }
        let interfaces: Vec<TypeId> = class
            .implements
            .iter()
            .flat_map(|c| c.real_elements())
            .filter_map(|t| resolve_type_tree(builder, unit, scope, t))
            .collect();

        let mut members = Vec::new();
        let mut methods = Vec::new();
        let mut has_constructor = false;
        for member in class_members(class) {
            match &member {
                Tree::ClassDeclaration(nested) => self.declare(builder, unit, scope, nested),
                Tree::VariableDeclarations(fields) => {
                    let ty = fields
                        .type_expression
                        .as_ref()
                        .and_then(|t| resolve_type_tree(builder, unit, scope, t));
                    for variable in fields.named_variables() {
                        let handle = builder.variable_type(VariableType {
                            name: variable.simple_name().to_string(),
                            owner: Some(id),
                            ty,
                        });
                        self.fields.insert(variable.id, handle);
                        members.push(handle);
                    }
                }
                Tree::MethodDeclaration(method) => {
                    has_constructor |= method.is_constructor();
                    let handle = self.declare_method(builder, unit, scope, id, method);
                    methods.push(handle);
                }
                _ => {}
            }
        }

        if !has_constructor && matches!(class.kind.element, ClassKind::Class | ClassKind::Enum) {
            methods.push(builder.method_type(MethodType {
                declaring_type: id,
                name: MethodType::CONSTRUCTOR_NAME.to_string(),
                return_type: None,
                parameter_names: Vec::new(),
                parameter_types: Vec::new(),
                is_constructor: true,
            }));
        }

        if let Some(c) = builder.class_mut(id) {
            c.supertype = supertype;
            c.interfaces = interfaces;
            c.members = members;
            c.methods = methods;
        }
        scope.classes.pop();
        scope.type_parameters.pop();
    }

    fn declare_method(
        &mut self,
        builder: &mut TypeTableBuilder,
        unit: &UnitScope,
        scope: &mut TypeScope,
        class: TypeId,
        method: &MethodDeclaration,
    ) -> TypeId {
        let name = if method.is_constructor() {
            MethodType::CONSTRUCTOR_NAME.to_string()
        } else {
            method.simple_name().to_string()
        };

        let mut parameters = HashMap::new();
        for (type_parameter, _) in type_parameter_names(&method.type_parameters) {
            let key = format!("{}#{}.{}", fqn_of(builder, class), name, type_parameter);
            let generic = builder.intern(
                key,
                JavaType::GenericTypeVariable {
                    name: type_parameter.clone(),
                    bounds: Vec::new(),
                },
            );
            parameters.insert(type_parameter, generic);
        }
        scope.type_parameters.push(parameters.clone());

        let mut parameter_names = Vec::new();
        let mut parameter_types = Vec::new();
        for parameter in method
            .parameters
            .real_elements()
            .filter_map(|t| t.as_variable_declarations())
        {
            let resolved = parameter
                .type_expression
                .as_ref()
                .and_then(|t| resolve_type_tree(builder, unit, scope, t));
            let ty = match (resolved, parameter.varargs.is_some()) {
                (Some(ty), true) => builder.array_of(ty),
                (Some(ty), false) => ty,
                (None, _) => builder.unknown(),
            };
            parameter_types.push(ty);
            parameter_names.extend(
                parameter
                    .named_variables()
                    .map(|v| v.simple_name().to_string()),
            );
        }
        let return_type = match &method.return_type {
            Some(t) => Some(
                resolve_type_tree(builder, unit, scope, t).unwrap_or_else(|| builder.unknown()),
            ),
            None => None,
        };
        scope.type_parameters.pop();

        let handle = builder.method_type(MethodType {
            declaring_type: class,
            name,
            return_type,
            parameter_names,
            parameter_types,
            is_constructor: method.is_constructor(),
        });
        self.methods.insert(method.id, handle);
        self.type_parameters.insert(method.id, parameters);
        handle
    }
}

fn fqn_of(builder: &TypeTableBuilder, id: TypeId) -> String {
    builder.class(id).map(|c| c.fqn.clone()).unwrap_or_default()
}

fn resolve_bounds(
    builder: &mut TypeTableBuilder,
    unit: &UnitScope,
    scope: &TypeScope,
    bounds: &Option<Container<Tree>>,
) -> Vec<TypeId> {
    bounds
        .iter()
        .flat_map(|c| c.real_elements())
        .filter_map(|t| resolve_type_tree(builder, unit, scope, t))
        .collect()
}

// ============================================================================
// Member lookup
// ============================================================================

/// Walk `start` and its supertypes breadth-first, carrying the mapping from
/// each class's type parameters to the arguments they were bound to.
fn hierarchy(builder: &TypeTableBuilder, start: TypeId) -> Vec<(TypeId, HashMap<TypeId, TypeId>)> {
    let mut result = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([(start, HashMap::new())]);
    while let Some((ty, bindings)) = queue.pop_front() {
        let (class_id, bindings) = match builder.get(ty) {
            Some(JavaType::Class(_)) => (ty, bindings),
            Some(JavaType::Parameterized { base, arguments }) => {
                let parameters = builder
                    .class(*base)
                    .map(|c| c.type_parameters.clone())
                    .unwrap_or_default();
                let bound = parameters
                    .into_iter()
                    .zip(arguments.iter().map(|a| *bindings.get(a).unwrap_or(a)))
                    .collect();
                (*base, bound)
            }
            Some(JavaType::GenericTypeVariable { bounds, .. }) => {
                for bound in bounds {
                    queue.push_back((*bound, HashMap::new()));
                }
                if bounds.is_empty() {
                    if let Some(object) = class_lookup(builder, OBJECT) {
                        queue.push_back((object, HashMap::new()));
                    }
                }
                continue;
            }
            Some(JavaType::Array { .. }) => match class_lookup(builder, OBJECT) {
                Some(object) => (object, HashMap::new()),
                None => continue,
            },
            _ => continue,
        };
        if !visited.insert(class_id) {
            continue;
        }
        let Some(class) = builder.class(class_id) else {
            continue;
        };
        match class.supertype {
            Some(supertype) => queue.push_back((supertype, bindings.clone())),
            None if class.fqn != OBJECT => {
                if let Some(object) = class_lookup(builder, OBJECT) {
                    queue.push_back((object, HashMap::new()));
                }
            }
            None => {}
        }
        for interface in &class.interfaces {
            queue.push_back((*interface, bindings.clone()));
        }
        result.push((class_id, bindings));
    }
    result
}

fn find_field(builder: &TypeTableBuilder, receiver: TypeId, name: &str) -> Option<TypeId> {
    hierarchy(builder, receiver).into_iter().find_map(|(class, _)| {
        builder.class(class)?.members.iter().copied().find(|m| {
            builder.variable(*m).map(|v| v.name.as_str()) == Some(name)
        })
    })
}

/// Pick the best overload among `candidates` with the right arity: the one
/// whose parameter types match the most argument types exactly.
fn best_overload(
    builder: &TypeTableBuilder,
    candidates: impl Iterator<Item = TypeId>,
    arguments: &[Option<TypeId>],
) -> Option<TypeId> {
    let mut best: Option<(usize, TypeId)> = None;
    for candidate in candidates {
        let Some(method) = builder.method(candidate) else {
            continue;
        };
        if method.parameter_types.len() != arguments.len() {
            continue;
        }
        let score = method
            .parameter_types
            .iter()
            .zip(arguments)
            .filter(|(param, arg)| arg.is_some_and(|a| a == **param))
            .count();
        if best.map_or(true, |(s, _)| score > s) {
            best = Some((score, candidate));
        }
    }
    best.map(|(_, id)| id)
}

/// The closest method named `name` applicable to `arguments`, with the
/// type-parameter bindings in effect where it was found.
fn find_method(
    builder: &TypeTableBuilder,
    receiver: TypeId,
    name: &str,
    arguments: &[Option<TypeId>],
) -> Option<(TypeId, HashMap<TypeId, TypeId>)> {
    hierarchy(builder, receiver)
        .into_iter()
        .find_map(|(class, bindings)| {
            let methods = builder.class(class)?.methods.clone();
            let candidates = methods
                .into_iter()
                .filter(|m| builder.method(*m).is_some_and(|m| m.name == name && !m.is_constructor));
            best_overload(builder, candidates, arguments).map(|m| (m, bindings))
        })
}

fn find_constructor(
    builder: &TypeTableBuilder,
    class: TypeId,
    arguments: &[Option<TypeId>],
) -> Option<TypeId> {
    let class_id = match builder.get(class)? {
        JavaType::Parameterized { base, .. } => *base,
        _ => class,
    };
    let methods = builder.class(class_id)?.methods.clone();
    let candidates = methods
        .into_iter()
        .filter(|m| builder.method(*m).is_some_and(|m| m.is_constructor));
    best_overload(builder, candidates, arguments)
}

// ============================================================================
// Expression attribution (pass 3)
// ============================================================================

struct Attributor<'a> {
    builder: &'a mut TypeTableBuilder,
    declarations: &'a Declarations,
    unit: &'a UnitScope,
    type_scope: TypeScope,
    /// Local variables and parameters, innermost scope last.
    locals: Vec<HashMap<String, TypeId>>,
    /// Enclosing method handles (or `None` for undeclared methods).
    methods: Vec<Option<TypeId>>,
}

impl Attributor<'_> {
    fn current_class(&self) -> Option<TypeId> {
        self.type_scope.classes.last().copied()
    }

    fn primitive(&mut self, kind: PrimitiveKind) -> TypeId {
        self.builder.primitive(kind)
    }

    fn primitive_kind(&self, id: Option<TypeId>) -> Option<PrimitiveKind> {
        match self.builder.get(id?)? {
            JavaType::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    fn is_string(&self, id: Option<TypeId>) -> bool {
        id.is_some_and(|id| {
            self.builder
                .class(id)
                .is_some_and(|c| c.fqn == STRING)
        })
    }

    fn variable_type(&self, variable: TypeId) -> Option<TypeId> {
        self.builder.variable(variable).and_then(|v| v.ty)
    }

    fn lookup_local(&self, name: &str) -> Option<TypeId> {
        self.locals
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    /// A field visible by simple name from the enclosing classes.
    fn lookup_field(&self, name: &str) -> Option<TypeId> {
        self.type_scope
            .classes
            .iter()
            .rev()
            .find_map(|class| find_field(self.builder, *class, name))
    }

    fn declare_local(&mut self, name: &str, variable: TypeId) {
        if let Some(scope) = self.locals.last_mut() {
            scope.insert(name.to_string(), variable);
        }
    }

    /// Attribute a tree in type position.
    fn type_tree(&mut self, tree: &Tree) -> Tree {
        match tree {
            Tree::Primitive(n) => {
                let ty = self.primitive(n.kind);
                Tree::from(Arc::clone(n).with_type_(Some(ty)))
            }
            Tree::Identifier(n) => {
                let ty = resolve_simple(self.builder, self.unit, &self.type_scope, &n.simple_name);
                Tree::from(Arc::clone(n).with_type_(ty))
            }
            Tree::FieldAccess(n) => {
                let ty = tree
                    .qualified_name()
                    .and_then(|name| resolve_name(self.builder, self.unit, &self.type_scope, &name));
                let target = match n.target.qualified_name() {
                    Some(name)
                        if resolve_name(self.builder, self.unit, &self.type_scope, &name)
                            .is_some() =>
                    {
                        self.type_tree(&n.target)
                    }
                    _ => n.target.clone(),
                };
                let name = n.name.clone().map(|t| match t.as_identifier() {
                    Some(id) => Tree::from(Arc::clone(id).with_type_(ty)),
                    None => t,
                });
                Tree::from(
                    Arc::clone(n)
                        .with_target(target)
                        .with_name(name)
                        .with_type_(ty),
                )
            }
            Tree::ParameterizedType(n) => {
                let clazz = self.type_tree(&n.clazz);
                let type_parameters = n.type_parameters.clone().map(|c| {
                    let elements = c
                        .elements
                        .iter()
                        .map(|rp| rp.clone().map(|t| self.type_tree(&t)))
                        .collect();
                    c.with_padded_elements(elements)
                });
                let base = clazz.type_id();
                let arguments: Option<Vec<TypeId>> = type_parameters
                    .iter()
                    .flat_map(|c| c.real_elements())
                    .map(Tree::type_id)
                    .collect();
                let ty = match (base, arguments) {
                    (Some(base), Some(arguments)) if !arguments.is_empty() => {
                        Some(self.builder.parameterized(base, arguments))
                    }
                    (base, _) => base,
                };
                Tree::from(
                    Arc::clone(n)
                        .with_clazz(clazz)
                        .with_type_parameters(type_parameters)
                        .with_type_(ty),
                )
            }
            Tree::ArrayType(n) => {
                let element_type = self.type_tree(&n.element_type);
                let ty = element_type.type_id().map(|e| self.builder.array_of(e));
                Tree::from(
                    Arc::clone(n)
                        .with_element_type(element_type)
                        .with_type_(ty),
                )
            }
            _ => tree.clone(),
        }
    }

    fn type_container(&mut self, container: &Option<Container<Tree>>) -> Option<Container<Tree>> {
        container.clone().map(|c| {
            let elements = c
                .elements
                .iter()
                .map(|rp| rp.clone().map(|t| self.type_tree(&t)))
                .collect();
            c.with_padded_elements(elements)
        })
    }

    /// Attribute a type parameter list whose handles were declared under
    /// `owner`.
    fn type_parameters(
        &mut self,
        container: &Option<Container<Tree>>,
        owner: NodeId,
    ) -> Option<Container<Tree>> {
        let declared = self
            .declarations
            .type_parameters
            .get(&owner)
            .cloned()
            .unwrap_or_default();
        container.clone().map(|c| {
            let elements = c
                .elements
                .iter()
                .map(|rp| {
                    rp.clone().map(|t| match t.as_type_parameter() {
                        Some(tp) => {
                            let ty = tp.name.simple_name().and_then(|n| declared.get(n)).copied();
                            let name = match tp.name.as_identifier() {
                                Some(id) => Tree::from(Arc::clone(id).with_type_(ty)),
                                None => tp.name.clone(),
                            };
                            let bounds = self.type_container(&tp.bounds);
                            Tree::from(Arc::clone(tp).with_name(name).with_bounds(bounds))
                        }
                        None => t,
                    })
                })
                .collect();
            c.with_padded_elements(elements)
        })
    }

    fn argument_types(arguments: &Container<Tree>) -> Vec<Option<TypeId>> {
        arguments.real_elements().map(Tree::type_id).collect()
    }
}

fn typed_identifier(tree: &Tree, ty: Option<TypeId>, field: Option<TypeId>) -> Tree {
    match tree.as_identifier() {
        Some(id) => Tree::from(Arc::clone(id).with_type_(ty).with_field_type(field)),
        None => tree.clone(),
    }
}

impl TreeVisitor<()> for Attributor<'_> {
    fn visit_package(&mut self, node: Arc<Package>, _: &mut Cursor, _: &mut ()) -> Option<Tree> {
        Some(Tree::from(node))
    }

    fn visit_import(&mut self, node: Arc<Import>, _: &mut Cursor, _: &mut ()) -> Option<Tree> {
        Some(Tree::from(node))
    }

    fn visit_class_declaration(
        &mut self,
        node: Arc<ClassDeclaration>,
        cursor: &mut Cursor,
        p: &mut (),
    ) -> Option<Tree> {
        let class = self.declarations.classes.get(&node.id).copied();
        if let Some(class) = class {
            self.type_scope.classes.push(class);
        }
        self.type_scope.type_parameters.push(
            self.declarations
                .type_parameters
                .get(&node.id)
                .cloned()
                .unwrap_or_default(),
        );
        let saved_locals = std::mem::take(&mut self.locals);

        let leading_annotations = visit_list(self, &node.leading_annotations, cursor, p);
        let modifiers = visit_list(self, &node.modifiers, cursor, p);
        let name = typed_identifier(&node.name, class, None);
        let type_parameters = self.type_parameters(&node.type_parameters, node.id);
        let extends = node
            .extends
            .clone()
            .map(|lp| lp.map(|t| self.type_tree(&t)));
        let implements = self.type_container(&node.implements);
        let body = visit_required(self, &node.body, cursor, p);

        self.locals = saved_locals;
        self.type_scope.type_parameters.pop();
        if class.is_some() {
            self.type_scope.classes.pop();
        }

        Some(Tree::from(
            node.with_leading_annotations(leading_annotations)
                .with_modifiers(modifiers)
                .with_name(name)
                .with_type_parameters(type_parameters)
                .with_extends(extends)
                .with_implements(implements)
                .with_body(body)
                .with_class_type(class),
        ))
    }

    fn visit_method_declaration(
        &mut self,
        node: Arc<MethodDeclaration>,
        cursor: &mut Cursor,
        p: &mut (),
    ) -> Option<Tree> {
        let method = self.declarations.methods.get(&node.id).copied();
        self.methods.push(method);
        self.type_scope.type_parameters.push(
            self.declarations
                .type_parameters
                .get(&node.id)
                .cloned()
                .unwrap_or_default(),
        );
        self.locals.push(HashMap::new());

        let leading_annotations = visit_list(self, &node.leading_annotations, cursor, p);
        let modifiers = visit_list(self, &node.modifiers, cursor, p);
        let type_parameters = self.type_parameters(&node.type_parameters, node.id);
        let return_type = node.return_type.as_ref().map(|t| self.type_tree(t));
        let return_id = return_type.as_ref().and_then(Tree::type_id);
        let name = typed_identifier(&node.name, return_id, None);
        let parameters = visit_container(self, &node.parameters, cursor, p);
        let throws = self.type_container(&node.throws);
        let body = visit_optional(self, &node.body, cursor, p);

        self.locals.pop();
        self.type_scope.type_parameters.pop();
        self.methods.pop();

        Some(Tree::from(
            node.with_leading_annotations(leading_annotations)
                .with_modifiers(modifiers)
                .with_type_parameters(type_parameters)
                .with_return_type(return_type)
                .with_name(name)
                .with_parameters(parameters)
                .with_throws(throws)
                .with_body(body)
                .with_method_type(method),
        ))
    }

    fn visit_variable_declarations(
        &mut self,
        node: Arc<VariableDeclarations>,
        cursor: &mut Cursor,
        p: &mut (),
    ) -> Option<Tree> {
        let leading_annotations = visit_list(self, &node.leading_annotations, cursor, p);
        let modifiers = visit_list(self, &node.modifiers, cursor, p);
        let type_expression = node.type_expression.as_ref().map(|t| self.type_tree(t));
        let mut ty = type_expression.as_ref().and_then(Tree::type_id);
        if node.varargs.is_some() {
            ty = ty.map(|t| self.builder.array_of(t));
        }

        let mut variables = Vec::with_capacity(node.variables.len());
        for rp in &node.variables {
            let Some(variable) = rp.element.as_named_variable() else {
                variables.push(rp.clone());
                continue;
            };
            let initializer = variable
                .initializer
                .as_ref()
                .map(|lp| visit_required_left_padded(self, lp, cursor, p));
            let name = variable.simple_name().to_string();
            let handle = match self.declarations.fields.get(&variable.id) {
                Some(field) => *field,
                None => {
                    let owner = self.methods.last().copied().flatten().or(self.current_class());
                    let handle = self.builder.variable_type(VariableType {
                        name: name.clone(),
                        owner,
                        ty,
                    });
                    self.declare_local(&name, handle);
                    handle
                }
            };
            let named = Arc::clone(variable)
                .with_name(typed_identifier(&variable.name, ty, Some(handle)))
                .with_initializer(initializer)
                .with_variable_type(Some(handle));
            variables.push(rp.clone().with_element(Tree::from(named)));
        }

        Some(Tree::from(
            node.with_leading_annotations(leading_annotations)
                .with_modifiers(modifiers)
                .with_type_expression(type_expression)
                .with_variables(variables),
        ))
    }

    fn visit_block(&mut self, node: Arc<Block>, cursor: &mut Cursor, p: &mut ()) -> Option<Tree> {
        self.locals.push(HashMap::new());
        let block = walk_block(self, node, cursor, p);
        self.locals.pop();
        Some(Tree::from(block))
    }

    fn visit_annotation(
        &mut self,
        node: Arc<Annotation>,
        cursor: &mut Cursor,
        p: &mut (),
    ) -> Option<Tree> {
        let annotation_type = self.type_tree(&node.annotation_type);
        let arguments = visit_optional_container(self, &node.arguments, cursor, p);
        Some(Tree::from(
            node.with_annotation_type(annotation_type)
                .with_arguments(arguments),
        ))
    }

    fn visit_identifier(
        &mut self,
        node: Arc<Identifier>,
        _: &mut Cursor,
        _: &mut (),
    ) -> Option<Tree> {
        let name = node.simple_name.as_str();
        let (ty, field) = match name {
            "this" => (self.current_class(), None),
            "super" => (
                self.current_class()
                    .and_then(|c| self.builder.class(c))
                    .and_then(|c| c.supertype),
                None,
            ),
            _ => match self.lookup_local(name).or_else(|| self.lookup_field(name)) {
                Some(variable) => (self.variable_type(variable), Some(variable)),
                None => (
                    resolve_simple(self.builder, self.unit, &self.type_scope, name),
                    None,
                ),
            },
        };
        Some(Tree::from(node.with_type_(ty).with_field_type(field)))
    }

    fn visit_field_access(
        &mut self,
        node: Arc<FieldAccess>,
        cursor: &mut Cursor,
        p: &mut (),
    ) -> Option<Tree> {
        let target = visit_required(self, &node.target, cursor, p);
        let name = node.name.element.simple_name().unwrap_or_default().to_string();

        let (ty, field) = match target.type_id() {
            Some(receiver) if matches!(self.builder.get(receiver), Some(JavaType::Array { .. })) => {
                let int = (name == "length").then(|| self.primitive(PrimitiveKind::Int));
                (int, None)
            }
            Some(receiver) => match find_field(self.builder, receiver, &name) {
                Some(variable) => (self.variable_type(variable), Some(variable)),
                None => {
                    // `Outer.Inner`
                    let nested = self
                        .builder
                        .class(receiver)
                        .map(|c| format!("{}${}", c.fqn, name));
                    (nested.and_then(|fqn| class_lookup(self.builder, &fqn)), None)
                }
            },
            None => {
                // A package-qualified class name.
                let qualified = Tree::from(Arc::clone(&node)).qualified_name();
                let class = qualified.and_then(|q| class_lookup(self.builder, &q));
                (class, None)
            }
        };

        let name_tree = node
            .name
            .clone()
            .map(|t| typed_identifier(&t, ty, field));
        Some(Tree::from(
            node.with_target(target)
                .with_name(name_tree)
                .with_type_(ty),
        ))
    }

    fn visit_array_access(
        &mut self,
        node: Arc<ArrayAccess>,
        cursor: &mut Cursor,
        p: &mut (),
    ) -> Option<Tree> {
        let indexed = visit_required(self, &node.indexed, cursor, p);
        let index = visit_required_left_padded(self, &node.index, cursor, p);
        let ty = match indexed.type_id().and_then(|t| self.builder.get(t)) {
            Some(JavaType::Array { element }) => Some(*element),
            _ => None,
        };
        Some(Tree::from(
            node.with_indexed(indexed)
                .with_index(index)
                .with_type_(ty),
        ))
    }

    fn visit_method_invocation(
        &mut self,
        node: Arc<MethodInvocation>,
        cursor: &mut Cursor,
        p: &mut (),
    ) -> Option<Tree> {
        let select = node
            .select
            .as_ref()
            .map(|rp| visit_required_right_padded(self, rp, cursor, p));
        let arguments = visit_container(self, &node.arguments, cursor, p);
        let argument_types = Self::argument_types(&arguments);
        let name = node.simple_name().to_string();

        let (method, ty) = match (name.as_str(), &select) {
            ("this", None) => {
                let ctor = self
                    .current_class()
                    .and_then(|c| find_constructor(self.builder, c, &argument_types));
                (ctor, None)
            }
            ("super", None) => {
                let supertype = self
                    .current_class()
                    .and_then(|c| self.builder.class(c))
                    .and_then(|c| c.supertype);
                let ctor =
                    supertype.and_then(|s| find_constructor(self.builder, s, &argument_types));
                (ctor, None)
            }
            _ => {
                let receivers: Vec<TypeId> = match &select {
                    Some(rp) => rp.element.type_id().into_iter().collect(),
                    None => self.type_scope.classes.iter().rev().copied().collect(),
                };
                let found = receivers
                    .into_iter()
                    .find_map(|r| find_method(self.builder, r, &name, &argument_types));
                match found {
                    Some((method, bindings)) => {
                        let ty = self
                            .builder
                            .method(method)
                            .and_then(|m| m.return_type)
                            .map(|r| *bindings.get(&r).unwrap_or(&r));
                        (Some(method), ty)
                    }
                    None => (None, None),
                }
            }
        };

        Some(Tree::from(
            node.with_select(select)
                .with_arguments(arguments)
                .with_method_type(method)
                .with_type_(ty),
        ))
    }

    fn visit_new_class(
        &mut self,
        node: Arc<NewClass>,
        cursor: &mut Cursor,
        p: &mut (),
    ) -> Option<Tree> {
        let clazz = self.type_tree(&node.clazz);
        let arguments = visit_container(self, &node.arguments, cursor, p);
        let body = visit_optional(self, &node.body, cursor, p);
        let ty = clazz.type_id();
        let argument_types = Self::argument_types(&arguments);
        let constructor = ty.and_then(|t| find_constructor(self.builder, t, &argument_types));
        Some(Tree::from(
            node.with_clazz(clazz)
                .with_arguments(arguments)
                .with_body(body)
                .with_constructor_type(constructor)
                .with_type_(ty),
        ))
    }

    fn visit_literal(&mut self, node: Arc<Literal>, cursor: &mut Cursor, p: &mut ()) -> Option<Tree> {
        let node = walk_literal(self, node, cursor, p);
        let ty = match node.kind {
            LiteralKind::Int => Some(self.primitive(PrimitiveKind::Int)),
            LiteralKind::Long => Some(self.primitive(PrimitiveKind::Long)),
            LiteralKind::Float => Some(self.primitive(PrimitiveKind::Float)),
            LiteralKind::Double => Some(self.primitive(PrimitiveKind::Double)),
            LiteralKind::Char => Some(self.primitive(PrimitiveKind::Char)),
            LiteralKind::Boolean => Some(self.primitive(PrimitiveKind::Boolean)),
            LiteralKind::Null => Some(self.primitive(PrimitiveKind::Null)),
            LiteralKind::String => class_lookup(self.builder, STRING),
        };
        Some(Tree::from(node.with_type_(ty)))
    }

    fn visit_binary(&mut self, node: Arc<Binary>, cursor: &mut Cursor, p: &mut ()) -> Option<Tree> {
        let node = walk_binary(self, node, cursor, p);
        let left = node.left.type_id();
        let right = node.right.type_id();
        let ty = if node.operator.element.is_boolean() {
            Some(self.primitive(PrimitiveKind::Boolean))
        } else if node.operator.element == BinaryOperator::Addition
            && (self.is_string(left) || self.is_string(right))
        {
            left.filter(|l| self.is_string(Some(*l))).or(right)
        } else {
            // Binary numeric promotion, at least to int.
            let ranked = |kind: Option<PrimitiveKind>| kind.and_then(|k| k.numeric_rank().map(|r| (r, k)));
            match (ranked(self.primitive_kind(left)), ranked(self.primitive_kind(right))) {
                (Some(l), Some(r)) => {
                    let (rank, kind) = if l.0 >= r.0 { l } else { r };
                    let kind = if rank < 3 { PrimitiveKind::Int } else { kind };
                    Some(self.primitive(kind))
                }
                _ => None,
            }
        };
        Some(Tree::from(node.with_type_(ty)))
    }

    fn visit_unary(&mut self, node: Arc<Unary>, cursor: &mut Cursor, p: &mut ()) -> Option<Tree> {
        let node = walk_unary(self, node, cursor, p);
        let ty = if node.operator.element == UnaryOperator::Not {
            Some(self.primitive(PrimitiveKind::Boolean))
        } else {
            node.expression.type_id()
        };
        Some(Tree::from(node.with_type_(ty)))
    }

    fn visit_assignment(
        &mut self,
        node: Arc<Assignment>,
        cursor: &mut Cursor,
        p: &mut (),
    ) -> Option<Tree> {
        let node = walk_assignment(self, node, cursor, p);
        let ty = node.variable.type_id();
        Some(Tree::from(node.with_type_(ty)))
    }

    fn visit_ternary(&mut self, node: Arc<Ternary>, cursor: &mut Cursor, p: &mut ()) -> Option<Tree> {
        let node = walk_ternary(self, node, cursor, p);
        let ty = node
            .true_part
            .element
            .type_id()
            .or_else(|| node.false_part.element.type_id());
        Some(Tree::from(node.with_type_(ty)))
    }
}
