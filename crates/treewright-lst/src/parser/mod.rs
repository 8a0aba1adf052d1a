// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A reference front-end for a Java subset: tokenizer, parser and type
//! attribution.
//!
//! The front-end exists to produce attributed trees for tests and demos. It
//! covers packages, imports, classes and interfaces, fields, constructors,
//! methods, the common statements and the full expression grammar except
//! lambdas, casts and array creation. Anything else is kept verbatim as an
//! `Erroneous` node so printing still reproduces the input.
//!
//! All sources passed to one [`JavaParser::parse`] call (and the classpath
//! stubs) are attributed against one shared [`TypeTable`].

mod attribution;
mod grammar;
mod stubs;
mod tokenizer;

pub use stubs::JDK_STUBS;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info_span, warn};
use treewright_core::{Marker, Markers, NodeId};

use crate::error::ParseError;
use crate::space::Space;
use crate::tree::{CompilationUnit, Erroneous, Tree};
use crate::types::TypeTable;

/// Front-end settings.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// `(path, source)` pairs attributed before the user sources but not
    /// returned.
    pub classpath_sources: Vec<(String, String)>,
    /// Packages whose classes are visible without an import.
    pub default_package_imports: Vec<String>,
    /// Log a warning for every erroneous node produced by recovery.
    pub log_recovery: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            classpath_sources: JDK_STUBS
                .iter()
                .map(|(path, source)| (path.to_string(), source.to_string()))
                .collect(),
            default_package_imports: vec!["java.lang".to_string()],
            log_recovery: true,
        }
    }
}

/// Parses and attributes Java sources.
#[derive(Debug, Clone, Default)]
pub struct JavaParser {
    options: ParserOptions,
}

impl JavaParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse `sources` and attribute them together.
    ///
    /// Syntax errors become `Erroneous` nodes. A source that cannot be
    /// tokenized at all (an unterminated comment or literal) becomes a unit
    /// holding its whole text as one `Erroneous` node, and the other sources
    /// are unaffected. Fails only when a classpath source cannot be
    /// tokenized.
    pub fn parse<P: AsRef<Path>, S: AsRef<str>>(
        &self,
        sources: &[(P, S)],
    ) -> Result<Vec<Arc<CompilationUnit>>, ParseError> {
        let _span = info_span!("parse", sources = sources.len()).entered();

        let mut units = Vec::new();
        for (path, source) in &self.options.classpath_sources {
            units.push(self.parse_unit(Path::new(path), source)?);
        }
        let classpath_len = units.len();
        for (path, source) in sources {
            let (path, source) = (path.as_ref(), source.as_ref());
            let unit = match self.parse_unit(path, source) {
                Ok(unit) => unit,
                Err(err) => {
                    warn!(error = %err, "keeping untokenizable source as an erroneous unit");
                    erroneous_unit(path, source, &err)
                }
            };
            units.push(unit);
        }

        let units = attribution::attribute(units, &self.options);
        debug!(units = units.len() - classpath_len, "attributed sources");
        Ok(units.into_iter().skip(classpath_len).map(Arc::new).collect())
    }

    fn parse_unit(&self, path: &Path, source: &str) -> Result<CompilationUnit, ParseError> {
        let tokens = tokenizer::tokenize(path, source)?;
        let parser = grammar::Parser::new(source, path, tokens, self.options.log_recovery);
        Ok(parser.compilation_unit(Arc::new(TypeTable::default())))
    }
}

/// A unit whose only child is the verbatim source.
fn erroneous_unit(path: &Path, source: &str, err: &ParseError) -> CompilationUnit {
    let body = Tree::from(Erroneous {
        id: NodeId::next(),
        prefix: Space::EMPTY,
        markers: Markers::new().add(Marker::parse_exception(err.to_string())),
        text: source.to_string(),
    });
    CompilationUnit::new(
        Space::EMPTY,
        path.to_path_buf(),
        None,
        Vec::new(),
        vec![body],
        Space::EMPTY,
        Arc::new(TypeTable::default()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::Codegen;
    use treewright_core::MarkerKind;

    #[test]
    fn test_parse_reproduces_source() {
        let source = "package a.b;\n\nimport java.util.List;\n\n/** Doc. */\npublic class A {\n    private List<String> names; // trailing\n}\n";
        let units = JavaParser::new().parse(&[("a/b/A.java", source)]).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].print(), source);
        assert_eq!(units[0].package_name(), "a.b");
    }

    #[test]
    fn test_untokenizable_source_does_not_sink_the_batch() {
        let bad = "class Bad { String s = \"oops; }";
        let units = JavaParser::new()
            .parse(&[("Good.java", "class Good { int x = 1; }"), ("Bad.java", bad)])
            .unwrap();
        assert_eq!(units.len(), 2);
        assert!(units[0].types.lookup("Good").is_some());

        assert_eq!(units[1].print(), bad);
        let erroneous = units[1].classes[0].as_erroneous().unwrap();
        let message = erroneous
            .markers
            .find(MarkerKind::ParseExceptionResult)
            .and_then(Marker::description)
            .unwrap();
        assert!(message.contains("Bad.java:1:24"));
        assert!(message.contains("unterminated string"));
    }

    #[test]
    fn test_untokenizable_classpath_source_fails() {
        let options = ParserOptions {
            classpath_sources: vec![("Lib.java".to_string(), "class Lib { /* oops".to_string())],
            ..ParserOptions::default()
        };
        let err = JavaParser::with_options(options)
            .parse(&[("A.java", "class A {}")])
            .unwrap_err();
        assert_eq!(err.path(), &std::path::PathBuf::from("Lib.java"));
    }

    #[test]
    fn test_invocations_resolve_by_name() {
        let units = JavaParser::new()
            .parse(&[("A.java", "class A { void f() { g(1); } void g(int x) {} }")])
            .unwrap();
        let tree = Tree::from(Arc::clone(&units[0]));
        let calls = crate::visitor::find_all(&tree, crate::tree::TreeKind::MethodInvocation);
        let call = calls[0].as_method_invocation().unwrap();
        assert_eq!(call.simple_name(), "g");
        let method = call.method_type.unwrap();
        assert_eq!(units[0].types.method_signature(method).as_deref(), Some("A g(int)"));
    }

    #[test]
    fn test_array_access_has_the_element_type() {
        let units = JavaParser::new()
            .parse(&[("A.java", "class A { int first(int[] xs) { return xs[0]; } }")])
            .unwrap();
        let tree = Tree::from(Arc::clone(&units[0]));
        let accesses = crate::visitor::find_all(&tree, crate::tree::TreeKind::ArrayAccess);
        let ty = accesses[0].type_id().unwrap();
        assert_eq!(units[0].types.fully_qualified_name(ty), "int");
    }

    #[test]
    fn test_units_share_one_type_table() {
        let units = JavaParser::new()
            .parse(&[("A.java", "class A {}"), ("B.java", "class B extends A {}")])
            .unwrap();
        assert!(Arc::ptr_eq(&units[0].types, &units[1].types));
        let b = units[1].types.lookup("B").unwrap();
        let a = units[1].types.lookup("A").unwrap();
        assert_eq!(units[1].types.class(b).unwrap().supertype, Some(a));
    }
}
