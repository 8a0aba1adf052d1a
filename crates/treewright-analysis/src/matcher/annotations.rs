// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use tracing::debug;
use treewright_lst::types::TypeTable;
use treewright_lst::{Annotation, Codegen, PrintOptions, Tree};

use super::erased_name;
use crate::error::PatternError;
use crate::pattern::{parse_annotation_pattern, AnnotationPattern};

/// Matches annotations against a pattern such as
/// `@java.lang.SuppressWarnings("unchecked")`.
///
/// The annotation type is matched by its resolved type. Arguments are
/// compared by their printed source (whitespace around them ignored), since
/// they are compile-time constants. Every argument named in the pattern must
/// be present; the annotation may carry more. A bare argument is the
/// `value` argument.
#[derive(Debug, Clone)]
pub struct AnnotationMatcher {
    pattern: String,
    parsed: AnnotationPattern,
}

impl AnnotationMatcher {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let parsed = parse_annotation_pattern(pattern)?;
        debug!(pattern, "built annotation matcher");
        Ok(Self {
            pattern: pattern.trim().to_string(),
            parsed,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches_annotation(&self, annotation: &Annotation, types: &TypeTable) -> bool {
        let type_matches = annotation
            .annotation_type
            .type_id()
            .and_then(|id| erased_name(types, id))
            .is_some_and(|name| self.parsed.annotation_type.matches_name(&name));
        if !type_matches {
            return false;
        }

        let Some(expected) = &self.parsed.arguments else {
            return true;
        };
        let actual = arguments(annotation);
        expected
            .iter()
            .all(|(name, value)| actual.iter().any(|(n, v)| n == name && v == value))
    }

    pub fn matches(&self, tree: &Tree, types: &TypeTable) -> bool {
        tree.as_annotation()
            .is_some_and(|a| self.matches_annotation(a, types))
    }
}

/// `(name, printed value)` for every argument.
fn arguments(annotation: &Annotation) -> Vec<(String, String)> {
    let Some(container) = &annotation.arguments else {
        return Vec::new();
    };
    let sanitized = PrintOptions::sanitized();
    container
        .real_elements()
        .map(|argument| match argument.as_assignment() {
            Some(assignment) => (
                assignment
                    .variable
                    .simple_name()
                    .unwrap_or("value")
                    .to_string(),
                assignment.assignment.print_with(&sanitized).trim().to_string(),
            ),
            None => (
                "value".to_string(),
                argument.print_with(&sanitized).trim().to_string(),
            ),
        })
        .collect()
}
