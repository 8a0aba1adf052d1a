//! Recipe execution for treewright trees.
//!
//! A recipe is a pass over a set of parsed source files. Plain [`Recipe`]s
//! transform each file independently. [`ScanningRecipe`]s first visit every
//! file read-only to build an accumulator, then transform each file with the
//! complete accumulator in hand. [`RecipeRunner`] drives both kinds and
//! reports the changed files as a [`RunResult`].
//!
//! ```
//! use treewright_lst::parser::JavaParser;
//! use treewright_recipe::search::FindMethods;
//! use treewright_recipe::{ExecutionContext, RecipeRunner};
//! use treewright_core::RunConfig;
//!
//! let source = "class A {\n    void f() { g(); }\n    void g() {}\n}\n";
//! let units = JavaParser::new().parse(&[("A.java", source)]).unwrap();
//! let recipe = FindMethods::new("A g()", false).unwrap();
//! let ctx = ExecutionContext::new(RunConfig::sequential());
//!
//! let run = RecipeRunner::run(&recipe, &units, &ctx).unwrap();
//! assert!(run.results[0].diff().contains("/*~~>*/g()"));
//! ```

use std::sync::Arc;

use treewright_lst::CompilationUnit;

pub mod context;
pub mod error;
pub mod modules;
pub mod recipe;
pub mod result;
pub mod runner;
pub mod search;

/// A parsed source file as recipes see it.
pub type SourceFile = Arc<CompilationUnit>;

pub use context::{ExecutionContext, SourceError};
pub use error::RecipeError;
pub use modules::MarkFilesInModulesContaining;
pub use recipe::{Recipe, RecipeVisitor, ScanningRecipe};
pub use result::{RecipeResult, RunResult};
pub use runner::RecipeRunner;
