// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A Lossless Semantic Tree for a Java-like language.
//!
//! A lossless semantic tree (LST) is a syntax tree that reproduces its source
//! text byte for byte when printed, including whitespace and comments, and
//! that also carries resolved type information for its names, calls and
//! declarations.
//!
//! # Layout
//!
//! - [`space`]: whitespace and comments ([`Space`], [`Comment`])
//! - [`padding`]: formatting attached to child slots ([`RightPadded`],
//!   [`LeftPadded`], [`Container`])
//! - [`tree`]: the closed set of node variants ([`Tree`]) and their
//!   copy-on-write `with_*` updates
//! - [`types`]: the interned type table and the [`TypeOracle`] queries
//! - [`print`]: the printer ([`Codegen`], [`CodegenState`])
//! - [`cursor`] and [`visitor`]: traversal with parent-chain context
//! - [`parser`]: a reference front-end producing attributed trees
//! - [`rpc`]: the tree transfer delta protocol
//!
//! # Example
//!
//! ```
//! use treewright_lst::parser::JavaParser;
//! use treewright_lst::Codegen;
//!
//! let source = "class A {\n    int x = 1; // one\n}\n";
//! let units = JavaParser::new().parse(&[("A.java", source)]).unwrap();
//! assert_eq!(units[0].print(), source);
//! ```

/// Invokes `$callback!` with the `snake_name: TypeName` list of every node
/// variant, in declaration order. Node-generic code (the `Tree` enum, the
/// visitor traits, dispatch) is generated from this one list so adding a
/// variant is a compile error everywhere it is not handled.
macro_rules! for_each_variant {
    ($callback:ident) => {
        $callback! {
            compilation_unit: CompilationUnit,
            package: Package,
            import: Import,
            class_declaration: ClassDeclaration,
            method_declaration: MethodDeclaration,
            block: Block,
            variable_declarations: VariableDeclarations,
            named_variable: NamedVariable,
            return: Return,
            if: If,
            else: Else,
            while_loop: WhileLoop,
            throw: Throw,
            empty: Empty,
            control_parentheses: ControlParentheses,
            parentheses: Parentheses,
            identifier: Identifier,
            field_access: FieldAccess,
            array_access: ArrayAccess,
            literal: Literal,
            method_invocation: MethodInvocation,
            new_class: NewClass,
            binary: Binary,
            unary: Unary,
            assignment: Assignment,
            ternary: Ternary,
            annotation: Annotation,
            modifier: Modifier,
            primitive: Primitive,
            parameterized_type: ParameterizedType,
            array_type: ArrayType,
            type_parameter: TypeParameter,
            erroneous: Erroneous,
        }
    };
}

pub mod cursor;
pub mod error;
pub mod padding;
pub mod parser;
pub mod print;
pub mod rpc;
pub mod space;
pub mod tree;
pub mod types;
pub mod visitor;

pub use cursor::Cursor;
pub use error::{CursorError, ParseError, RpcError};
pub use padding::{Container, LeftPadded, RightPadded};
pub use print::{Codegen, CodegenState, PrintOptions};
pub use space::{Comment, CommentStyle, Space};
pub use tree::*;
pub use types::{JavaType, TypeId, TypeOracle, TypeTable, TypeTableBuilder};
pub use visitor::{IsoVisitor, TreeVisitor, VisitResult};
