// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The type model: an interned, reference-counted table of types.
//!
//! Types reference each other through [`TypeId`] handles into a shared
//! [`TypeTable`] instead of owning each other. A class names its supertype and
//! members by handle, a method names its declaring class by handle, so the
//! cycles between them (class -> method -> declaring class) are plain data and
//! never recursive ownership.
//!
//! Tables are built with a [`TypeTableBuilder`], which interns every type by a
//! stable key (a class's fully-qualified name, a method's signature, ...). A
//! class handle can be reserved before its contents are known, which is how
//! self-referential and mutually-referential classes are represented. The
//! finished table is frozen and shared behind an `Arc` by every compilation
//! unit attributed against it.

mod oracle;

pub use oracle::TypeOracle;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle into a [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Primitive types, including `void` and the type of `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Void,
    Null,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 10] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Double,
        PrimitiveKind::Float,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Short,
        PrimitiveKind::Void,
        PrimitiveKind::Null,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Void => "void",
            PrimitiveKind::Null => "null",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|k| *k != PrimitiveKind::Null)
            .find(|k| k.keyword() == keyword)
    }

    /// Rank used for binary numeric promotion; `None` for non-numeric kinds.
    pub fn numeric_rank(&self) -> Option<u8> {
        match self {
            PrimitiveKind::Byte => Some(1),
            PrimitiveKind::Short => Some(2),
            PrimitiveKind::Char => Some(2),
            PrimitiveKind::Int => Some(3),
            PrimitiveKind::Long => Some(4),
            PrimitiveKind::Float => Some(5),
            PrimitiveKind::Double => Some(6),
            _ => None,
        }
    }
}

/// The declaration kind of a class-like type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl ClassKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Enum => "enum",
            ClassKind::Annotation => "@interface",
        }
    }
}

/// A class, interface, enum or annotation type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassType {
    /// Fully-qualified name; nested classes use `$` (`pkg.Outer$Inner`).
    pub fqn: String,
    pub kind: ClassKind,
    pub supertype: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub type_parameters: Vec<TypeId>,
    /// Field variables.
    pub members: Vec<TypeId>,
    pub methods: Vec<TypeId>,
    pub owning_class: Option<TypeId>,
}

impl ClassType {
    pub fn new(fqn: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            fqn: fqn.into(),
            kind,
            supertype: None,
            interfaces: Vec::new(),
            type_parameters: Vec::new(),
            members: Vec::new(),
            methods: Vec::new(),
            owning_class: None,
        }
    }

    /// The package portion of the fully-qualified name.
    pub fn package_name(&self) -> &str {
        package_name(&self.fqn)
    }

    /// The simple name, with nested classes written `Outer.Inner`.
    pub fn class_name(&self) -> String {
        class_name(&self.fqn)
    }
}

/// A method or constructor signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodType {
    pub declaring_type: TypeId,
    /// `<constructor>` for constructors.
    pub name: String,
    pub return_type: Option<TypeId>,
    pub parameter_names: Vec<String>,
    pub parameter_types: Vec<TypeId>,
    pub is_constructor: bool,
}

impl MethodType {
    pub const CONSTRUCTOR_NAME: &'static str = "<constructor>";
}

/// A field, local variable or parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableType {
    pub name: String,
    /// The declaring class for fields, the declaring method for locals and
    /// parameters.
    pub owner: Option<TypeId>,
    pub ty: Option<TypeId>,
}

/// A type in the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JavaType {
    Primitive(PrimitiveKind),
    Class(ClassType),
    Parameterized {
        base: TypeId,
        arguments: Vec<TypeId>,
    },
    GenericTypeVariable {
        name: String,
        bounds: Vec<TypeId>,
    },
    Array {
        element: TypeId,
    },
    Method(MethodType),
    Variable(VariableType),
    Unknown,
}

impl JavaType {
    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            JavaType::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodType> {
        match self {
            JavaType::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableType> {
        match self {
            JavaType::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, JavaType::Primitive(_))
    }
}

/// A frozen, shareable table of interned types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeTable {
    entries: Vec<JavaType>,
    index: HashMap<String, TypeId>,
}

impl TypeTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over every handle and type.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &JavaType)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, t)| (TypeId(i as u32), t))
    }

    /// Look up a type by its interning key; for classes this is the
    /// fully-qualified name.
    pub fn lookup(&self, key: &str) -> Option<TypeId> {
        self.index.get(key).copied()
    }

    pub fn get(&self, id: TypeId) -> Option<&JavaType> {
        self.entries.get(id.index())
    }

    /// The class behind `id`, looking through parameterization.
    pub fn class(&self, id: TypeId) -> Option<&ClassType> {
        match self.get(id)? {
            JavaType::Class(c) => Some(c),
            JavaType::Parameterized { base, .. } => self.get(*base)?.as_class(),
            _ => None,
        }
    }

    /// The class handle behind `id`, looking through parameterization.
    pub fn class_id(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id)? {
            JavaType::Class(_) => Some(id),
            JavaType::Parameterized { base, .. } => Some(*base),
            _ => None,
        }
    }

    pub fn method(&self, id: TypeId) -> Option<&MethodType> {
        self.get(id)?.as_method()
    }

    pub fn variable(&self, id: TypeId) -> Option<&VariableType> {
        self.get(id)?.as_variable()
    }

    pub fn primitive(&self, kind: PrimitiveKind) -> Option<TypeId> {
        self.lookup(kind.keyword())
    }

    pub fn is_primitive(&self, id: TypeId) -> bool {
        matches!(self.get(id), Some(JavaType::Primitive(k)) if *k != PrimitiveKind::Null)
    }

    /// The name a type is matched by: the fully-qualified name for classes
    /// (and parameterized classes), the keyword for primitives, `E[]` for
    /// arrays, the variable name for generic type variables.
    pub fn fully_qualified_name(&self, id: TypeId) -> String {
        self.name_of(id, 0)
    }

    fn name_of(&self, id: TypeId, depth: usize) -> String {
        // Array-of-array chains are the only nesting; bound the walk anyway.
        if depth > 32 {
            return "Unknown".to_string();
        }
        match self.get(id) {
            Some(JavaType::Primitive(k)) => k.keyword().to_string(),
            Some(JavaType::Class(c)) => c.fqn.clone(),
            Some(JavaType::Parameterized { base, .. }) => self.name_of(*base, depth + 1),
            Some(JavaType::GenericTypeVariable { name, .. }) => name.clone(),
            Some(JavaType::Array { element }) => format!("{}[]", self.name_of(*element, depth + 1)),
            Some(JavaType::Method(m)) => self.name_of(m.declaring_type, depth + 1),
            Some(JavaType::Variable(v)) => match v.ty {
                Some(ty) => self.name_of(ty, depth + 1),
                None => "Unknown".to_string(),
            },
            Some(JavaType::Unknown) | None => "Unknown".to_string(),
        }
    }

    /// A readable signature: `java.util.List add(java.lang.Object)`.
    pub fn method_signature(&self, id: TypeId) -> Option<String> {
        let method = self.method(id)?;
        let params: Vec<String> = method
            .parameter_types
            .iter()
            .map(|p| self.fully_qualified_name(*p))
            .collect();
        Some(format!(
            "{} {}({})",
            self.fully_qualified_name(method.declaring_type),
            method.name,
            params.join(",")
        ))
    }

    /// Start a builder seeded with this table's contents.
    pub fn to_builder(&self) -> TypeTableBuilder {
        let mut keys = vec![String::new(); self.entries.len()];
        for (key, id) in &self.index {
            if let Some(slot) = keys.get_mut(id.index()) {
                *slot = key.clone();
            }
        }
        TypeTableBuilder {
            entries: self.entries.clone(),
            keys,
            index: self.index.clone(),
        }
    }
}

/// The package portion of a fully-qualified name (`java.util` for
/// `java.util.Map$Entry`).
pub fn package_name(fqn: &str) -> &str {
    let outer = fqn.split('$').next().unwrap_or(fqn);
    match outer.rfind('.') {
        Some(i) => &fqn[..i],
        None => "",
    }
}

/// The simple name of a fully-qualified name, with nesting written with dots
/// (`Map.Entry` for `java.util.Map$Entry`).
pub fn class_name(fqn: &str) -> String {
    let package = package_name(fqn);
    let rest = if package.is_empty() {
        fqn
    } else {
        &fqn[package.len() + 1..]
    };
    rest.replace('$', ".")
}

/// Builds a [`TypeTable`], interning each type by a stable key.
#[derive(Debug, Clone)]
pub struct TypeTableBuilder {
    entries: Vec<JavaType>,
    keys: Vec<String>,
    index: HashMap<String, TypeId>,
}

impl Default for TypeTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTableBuilder {
    /// A builder with every primitive already interned.
    pub fn new() -> Self {
        let mut builder = Self {
            entries: Vec::new(),
            keys: Vec::new(),
            index: HashMap::new(),
        };
        for kind in PrimitiveKind::ALL {
            builder.intern(kind.keyword(), JavaType::Primitive(kind));
        }
        builder.intern("Unknown", JavaType::Unknown);
        builder
    }

    /// Intern `ty` under `key`, returning the existing handle when `key` is
    /// already present.
    pub fn intern(&mut self, key: impl Into<String>, ty: JavaType) -> TypeId {
        let key = key.into();
        if let Some(id) = self.index.get(&key) {
            return *id;
        }
        let id = TypeId(self.entries.len() as u32);
        self.entries.push(ty);
        self.keys.push(key.clone());
        self.index.insert(key, id);
        id
    }

    pub fn lookup(&self, key: &str) -> Option<TypeId> {
        self.index.get(key).copied()
    }

    pub fn get(&self, id: TypeId) -> Option<&JavaType> {
        self.entries.get(id.index())
    }

    /// Mutable access to an interned type. The interning key is not
    /// recomputed, so only fields that are not part of the key (class
    /// contents, type variable bounds) should change.
    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut JavaType> {
        self.entries.get_mut(id.index())
    }

    pub fn primitive(&mut self, kind: PrimitiveKind) -> TypeId {
        self.intern(kind.keyword(), JavaType::Primitive(kind))
    }

    pub fn unknown(&mut self) -> TypeId {
        self.intern("Unknown", JavaType::Unknown)
    }

    /// Reserve (or find) the class named `fqn`. The class starts out with no
    /// supertype or members; fill it in with [`TypeTableBuilder::class_mut`].
    pub fn reserve_class(&mut self, fqn: &str, kind: ClassKind) -> TypeId {
        self.intern(fqn, JavaType::Class(ClassType::new(fqn, kind)))
    }

    pub fn class_mut(&mut self, id: TypeId) -> Option<&mut ClassType> {
        match self.entries.get_mut(id.index()) {
            Some(JavaType::Class(c)) => Some(c),
            _ => None,
        }
    }

    pub fn class(&self, id: TypeId) -> Option<&ClassType> {
        match self.get(id)? {
            JavaType::Class(c) => Some(c),
            JavaType::Parameterized { base, .. } => self.get(*base)?.as_class(),
            _ => None,
        }
    }

    pub fn method(&self, id: TypeId) -> Option<&MethodType> {
        self.get(id)?.as_method()
    }

    pub fn variable(&self, id: TypeId) -> Option<&VariableType> {
        self.get(id)?.as_variable()
    }

    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        let key = format!("{}[]", self.key_of(element));
        self.intern(key, JavaType::Array { element })
    }

    pub fn parameterized(&mut self, base: TypeId, arguments: Vec<TypeId>) -> TypeId {
        let args: Vec<String> = arguments.iter().map(|a| self.key_of(*a)).collect();
        let key = format!("{}<{}>", self.key_of(base), args.join(","));
        self.intern(key, JavaType::Parameterized { base, arguments })
    }

    /// Intern a generic type variable scoped to `owner` (a class or method).
    pub fn generic(&mut self, owner: TypeId, name: &str, bounds: Vec<TypeId>) -> TypeId {
        let key = format!("{}#{}", self.key_of(owner), name);
        self.intern(
            key,
            JavaType::GenericTypeVariable {
                name: name.to_string(),
                bounds,
            },
        )
    }

    pub fn method_type(&mut self, method: MethodType) -> TypeId {
        let params: Vec<String> = method
            .parameter_types
            .iter()
            .map(|p| self.key_of(*p))
            .collect();
        let key = format!(
            "{}#{}({})",
            self.key_of(method.declaring_type),
            method.name,
            params.join(",")
        );
        self.intern(key, JavaType::Method(method))
    }

    pub fn variable_type(&mut self, variable: VariableType) -> TypeId {
        let owner = variable
            .owner
            .map(|o| self.key_of(o))
            .unwrap_or_default();
        let ty = variable.ty.map(|t| self.key_of(t)).unwrap_or_default();
        let key = format!("{}:{}:{}", owner, variable.name, ty);
        self.intern(key, JavaType::Variable(variable))
    }

    /// The interning key of an existing handle.
    fn key_of(&self, id: TypeId) -> String {
        self.keys
            .get(id.index())
            .cloned()
            .unwrap_or_else(|| format!("#{}", id.0))
    }

    pub fn build(self) -> TypeTable {
        TypeTable {
            entries: self.entries,
            index: self.index,
        }
    }
}
