// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Declarations: compilation units, imports, classes, methods, variables,
//! annotations, modifiers and type parameters.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use treewright_core::{Markers, NodeId};

use super::{impl_with, Tree};
use crate::cursor::Cursor;
use crate::padding::{Container, LeftPadded, RightPadded};
use crate::space::Space;
use crate::types::{ClassKind, TypeId, TypeTable};
use crate::visitor::{TreeVisitor, VisitResult};

// ============================================================================
// CompilationUnit
// ============================================================================

/// A source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub source_path: PathBuf,
    /// The package declaration; `after` is the space before its `;`.
    pub package: Option<RightPadded<Tree>>,
    /// Import declarations; `after` is the space before each `;`.
    pub imports: Vec<RightPadded<Tree>>,
    pub classes: Vec<Tree>,
    /// Trailing whitespace and comments at the end of the file.
    pub eof: Space,
    /// The table every type handle in this unit refers to. Transmitted
    /// separately from the tree by the transfer protocol.
    #[serde(skip)]
    pub types: Arc<TypeTable>,
    #[serde(skip)]
    types_in_use: TypesInUse,
}

impl_with!(CompilationUnit {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    source_path: PathBuf,
    package: Option<RightPadded<Tree>>,
    imports: Vec<RightPadded<Tree>>,
    classes: Vec<Tree>,
    eof: Space,
    types: Arc<TypeTable>,
});

impl CompilationUnit {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        prefix: Space,
        source_path: PathBuf,
        package: Option<RightPadded<Tree>>,
        imports: Vec<RightPadded<Tree>>,
        classes: Vec<Tree>,
        eof: Space,
        types: Arc<TypeTable>,
    ) -> Self {
        Self {
            id: NodeId::next(),
            prefix,
            markers: Markers::new(),
            source_path,
            package,
            imports,
            classes,
            eof,
            types,
            types_in_use: TypesInUse::default(),
        }
    }

    /// The declared package name, or `""` for the default package.
    pub fn package_name(&self) -> String {
        self.package
            .as_ref()
            .and_then(|p| p.element.as_package())
            .and_then(|p| p.expression.qualified_name())
            .unwrap_or_default()
    }

    /// Every type handle referenced anywhere in this unit: expression types,
    /// method and constructor types, variable types and declared classes.
    ///
    /// Computed on first use and cached on this allocation. Any `with_*`
    /// update produces a new allocation with an empty cache, so the set is
    /// never stale.
    pub fn types_in_use(&self) -> Arc<BTreeSet<TypeId>> {
        self.types_in_use
            .0
            .get_or_init(|| {
                let mut found = BTreeSet::new();
                let children = self
                    .package
                    .iter()
                    .chain(self.imports.iter())
                    .map(|rp| &rp.element)
                    .chain(self.classes.iter());
                for child in children {
                    TypeCollector.visit_root(child.clone(), &mut found);
                }
                Arc::new(found)
            })
            .clone()
    }
}

/// Per-allocation cache of [`CompilationUnit::types_in_use`]. Cloning yields
/// an empty cache.
#[derive(Default)]
struct TypesInUse(OnceLock<Arc<BTreeSet<TypeId>>>);

impl Clone for TypesInUse {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for TypesInUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.0.get().is_some() {
            "TypesInUse(cached)"
        } else {
            "TypesInUse(empty)"
        })
    }
}

struct TypeCollector;

impl TreeVisitor<BTreeSet<TypeId>> for TypeCollector {
    fn pre_visit(
        &mut self,
        tree: &Tree,
        _cursor: &mut Cursor,
        found: &mut BTreeSet<TypeId>,
    ) -> VisitResult {
        found.extend(tree.type_id());
        match tree {
            Tree::Identifier(n) => found.extend(n.field_type),
            Tree::MethodInvocation(n) => found.extend(n.method_type),
            Tree::NewClass(n) => found.extend(n.constructor_type),
            Tree::NamedVariable(n) => found.extend(n.variable_type),
            _ => {}
        }
        VisitResult::Continue
    }
}

// ============================================================================
// Package and imports
// ============================================================================

/// `package a.b.c` (the `;` belongs to the enclosing unit's padding).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub expression: Tree,
}

impl_with!(Package {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    expression: Tree,
});

/// `import [static] a.b.C` or `import a.b.*`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Import {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// `before` is the space before `static` when the import is static.
    pub is_static: LeftPadded<bool>,
    /// A field access chain; the last name is `*` for on-demand imports.
    pub qualid: Tree,
}

impl_with!(Import {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    is_static: LeftPadded<bool>,
    qualid: Tree,
});

impl Import {
    /// The imported name as written: `java.util.List`, `java.util.*`.
    pub fn type_name(&self) -> String {
        self.qualid.qualified_name().unwrap_or_default()
    }

    pub fn is_wildcard(&self) -> bool {
        self.qualid.simple_name() == Some("*")
    }

    /// Everything before the last segment.
    pub fn package_name(&self) -> String {
        let name = self.type_name();
        match name.rfind('.') {
            Some(i) => name[..i].to_string(),
            None => String::new(),
        }
    }
}

// ============================================================================
// Classes and methods
// ============================================================================

/// A class, interface or annotation type declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub leading_annotations: Vec<Tree>,
    pub modifiers: Vec<Tree>,
    /// The declaration keyword; `before` is the space before it.
    pub kind: LeftPadded<ClassKind>,
    pub name: Tree,
    pub type_parameters: Option<Container<Tree>>,
    /// `extends T` for classes.
    pub extends: Option<LeftPadded<Tree>>,
    /// `implements A, B` for classes; `extends A, B` for interfaces.
    pub implements: Option<Container<Tree>>,
    pub body: Tree,
    pub class_type: Option<TypeId>,
}

impl_with!(ClassDeclaration {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    leading_annotations: Vec<Tree>,
    modifiers: Vec<Tree>,
    kind: LeftPadded<ClassKind>,
    name: Tree,
    type_parameters: Option<Container<Tree>>,
    extends: Option<LeftPadded<Tree>>,
    implements: Option<Container<Tree>>,
    body: Tree,
    class_type: Option<TypeId>,
});

impl ClassDeclaration {
    pub fn simple_name(&self) -> &str {
        self.name.simple_name().unwrap_or_default()
    }

    pub fn has_modifier(&self, kind: ModifierKind) -> bool {
        has_modifier(&self.modifiers, kind)
    }
}

/// A method or constructor declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub leading_annotations: Vec<Tree>,
    pub modifiers: Vec<Tree>,
    pub type_parameters: Option<Container<Tree>>,
    /// `None` for constructors.
    pub return_type: Option<Tree>,
    pub name: Tree,
    /// `VariableDeclarations`, or a single `Empty` holding the space in `( )`.
    pub parameters: Container<Tree>,
    pub throws: Option<Container<Tree>>,
    /// `None` for abstract and interface methods (which end in `;`).
    pub body: Option<Tree>,
    pub method_type: Option<TypeId>,
}

impl_with!(MethodDeclaration {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    leading_annotations: Vec<Tree>,
    modifiers: Vec<Tree>,
    type_parameters: Option<Container<Tree>>,
    return_type: Option<Tree>,
    name: Tree,
    parameters: Container<Tree>,
    throws: Option<Container<Tree>>,
    body: Option<Tree>,
    method_type: Option<TypeId>,
});

impl MethodDeclaration {
    pub fn simple_name(&self) -> &str {
        self.name.simple_name().unwrap_or_default()
    }

    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    pub fn has_modifier(&self, kind: ModifierKind) -> bool {
        has_modifier(&self.modifiers, kind)
    }
}

// ============================================================================
// Variables
// ============================================================================

/// A field, local variable or parameter declaration: `final int a = 1, b;`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDeclarations {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub leading_annotations: Vec<Tree>,
    pub modifiers: Vec<Tree>,
    pub type_expression: Option<Tree>,
    /// The space before `...` on a varargs parameter.
    pub varargs: Option<Space>,
    /// `NamedVariable`s; `after` is the space before each `,`.
    pub variables: Vec<RightPadded<Tree>>,
}

impl_with!(VariableDeclarations {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    leading_annotations: Vec<Tree>,
    modifiers: Vec<Tree>,
    type_expression: Option<Tree>,
    varargs: Option<Space>,
    variables: Vec<RightPadded<Tree>>,
});

impl VariableDeclarations {
    pub fn has_modifier(&self, kind: ModifierKind) -> bool {
        has_modifier(&self.modifiers, kind)
    }

    pub fn named_variables(&self) -> impl Iterator<Item = &Arc<NamedVariable>> {
        self.variables.iter().filter_map(|rp| rp.element.as_named_variable())
    }
}

/// One declarator: `a = 1` in `int a = 1, b;`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedVariable {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub name: Tree,
    /// `before` is the space before `=`.
    pub initializer: Option<LeftPadded<Tree>>,
    /// The variable handle (owner, name, declared type).
    pub variable_type: Option<TypeId>,
}

impl_with!(NamedVariable {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    name: Tree,
    initializer: Option<LeftPadded<Tree>>,
    variable_type: Option<TypeId>,
});

impl NamedVariable {
    pub fn simple_name(&self) -> &str {
        self.name.simple_name().unwrap_or_default()
    }
}

// ============================================================================
// Annotations, modifiers, type parameters
// ============================================================================

/// `@Type` or `@Type(args)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub annotation_type: Tree,
    /// Expressions, or `Assignment`s for `name = value` pairs.
    pub arguments: Option<Container<Tree>>,
}

impl_with!(Annotation {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    annotation_type: Tree,
    arguments: Option<Container<Tree>>,
});

/// Modifier keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    Default,
}

impl ModifierKind {
    pub const ALL: [ModifierKind; 12] = [
        ModifierKind::Public,
        ModifierKind::Protected,
        ModifierKind::Private,
        ModifierKind::Static,
        ModifierKind::Final,
        ModifierKind::Abstract,
        ModifierKind::Native,
        ModifierKind::Synchronized,
        ModifierKind::Transient,
        ModifierKind::Volatile,
        ModifierKind::Strictfp,
        ModifierKind::Default,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            ModifierKind::Public => "public",
            ModifierKind::Protected => "protected",
            ModifierKind::Private => "private",
            ModifierKind::Static => "static",
            ModifierKind::Final => "final",
            ModifierKind::Abstract => "abstract",
            ModifierKind::Native => "native",
            ModifierKind::Synchronized => "synchronized",
            ModifierKind::Transient => "transient",
            ModifierKind::Volatile => "volatile",
            ModifierKind::Strictfp => "strictfp",
            ModifierKind::Default => "default",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.keyword() == keyword)
    }
}

/// A modifier keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modifier {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub keyword: ModifierKind,
}

impl_with!(Modifier {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    keyword: ModifierKind,
});

impl Modifier {
    pub fn new(prefix: Space, keyword: ModifierKind) -> Self {
        Self {
            id: NodeId::next(),
            prefix,
            markers: Markers::new(),
            keyword,
        }
    }
}

fn has_modifier(modifiers: &[Tree], kind: ModifierKind) -> bool {
    modifiers
        .iter()
        .any(|m| matches!(m, Tree::Modifier(m) if m.keyword == kind))
}

/// `T` or `T extends A & B` in a type parameter list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeParameter {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub name: Tree,
    /// `before` is the space before `extends`; elements are joined by `&`.
    pub bounds: Option<Container<Tree>>,
}

impl_with!(TypeParameter {
    id: NodeId,
    prefix: Space,
    markers: Markers,
    name: Tree,
    bounds: Option<Container<Tree>>,
});
