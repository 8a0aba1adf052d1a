// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Pattern matching and local analyses over the tree.
//!
//! - [`pattern`]: the pointcut grammar for type, method and annotation
//!   patterns, parsed once into reusable values
//! - [`matcher`]: [`TypeMatcher`], [`MethodMatcher`] and
//!   [`AnnotationMatcher`], which answer questions against attributed nodes
//! - [`flow`]: intraprocedural source-to-sink data and taint flow
//! - [`escape`]: locals that become reachable outside their defining scope
//!
//! Malformed patterns fail when the matcher is built, never while a tree is
//! being visited:
//!
//! ```
//! use treewright_analysis::TypeMatcher;
//!
//! assert!(TypeMatcher::new("java.util.*", false).is_ok());
//! assert!(TypeMatcher::new("java..util.", false).is_err());
//! ```

pub mod error;
pub mod escape;
pub mod flow;
pub mod matcher;
pub mod pattern;

pub use error::PatternError;
pub use escape::{Escape, EscapeAnalysis, EscapeKind};
pub use flow::{FlowMode, FlowPath, FlowResult, FlowState, LocalFlow, LocalFlowSpec};
pub use matcher::{AnnotationMatcher, MethodMatcher, TypeMatcher};
