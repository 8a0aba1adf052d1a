//! Treewright: lossless semantic trees and recipes for Java-like source.
//!
//! The engine is split into crates, re-exported here:
//!
//! - [`core`]: node identity, markers, the unified error, run configuration
//!   and diffs
//! - [`lst`]: the lossless semantic tree, its type table, printer, cursor,
//!   visitors, reference parser and transfer protocol
//! - [`analysis`]: type, method and annotation pattern matchers, local flow
//!   and escape analysis
//! - [`recipe`]: recipes, two-phase scanning recipes, the runner and the
//!   built-in searches
//!
//! ```
//! use treewright::lst::parser::JavaParser;
//! use treewright::recipe::search::FindTypes;
//! use treewright::recipe::{ExecutionContext, RecipeRunner};
//! use treewright::RunConfig;
//!
//! # fn main() -> Result<(), treewright::TreewrightError> {
//! let source = "import java.util.List;\nclass A { List<String> names; }\n";
//! let units = JavaParser::new().parse(&[("A.java", source)])?;
//! let recipe = FindTypes::new("java.util.List", false)?;
//! let ctx = ExecutionContext::new(RunConfig::sequential());
//! let run = RecipeRunner::run(&recipe, &units, &ctx)?;
//! assert_eq!(run.changed_paths().len(), 1);
//! # Ok(())
//! # }
//! ```

pub use treewright_analysis as analysis;
pub use treewright_core as core;
pub use treewright_lst as lst;
pub use treewright_recipe as recipe;

pub use treewright_core::{diff, error};
pub use treewright_core::{MarkerPrinting, OutputErrorCode, RunConfig, TreewrightError};

pub mod logging;
