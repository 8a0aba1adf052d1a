//! What a recipe run changed.

use std::path::Path;

use treewright_core::diff::unified_diff;
use treewright_lst::{Codegen, PrintOptions};

use crate::SourceFile;

/// One source file a run changed or deleted.
#[derive(Debug, Clone)]
pub struct RecipeResult {
    pub before: SourceFile,
    /// `None` when the recipe deleted the file.
    pub after: Option<SourceFile>,
}

impl RecipeResult {
    pub fn path(&self) -> &Path {
        &self.before.source_path
    }

    pub fn is_deletion(&self) -> bool {
        self.after.is_none()
    }

    /// Unified diff of the printed trees, with search results visible.
    pub fn diff(&self) -> String {
        self.diff_with(&PrintOptions::default())
    }

    pub fn diff_with(&self, options: &PrintOptions) -> String {
        let before = self.before.print_with(options);
        let after = self
            .after
            .as_ref()
            .map(|unit| unit.print_with(options))
            .unwrap_or_default();
        unified_diff(&self.path().to_string_lossy(), &before, &after)
    }
}

/// The outcome of a run: one entry per changed file, in input order.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    pub results: Vec<RecipeResult>,
}

impl RunResult {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn changed_paths(&self) -> Vec<&Path> {
        self.results.iter().map(RecipeResult::path).collect()
    }

    /// The trees after the run, for the changed files that were not deleted.
    pub fn after_trees(&self) -> impl Iterator<Item = &SourceFile> {
        self.results.iter().filter_map(|r| r.after.as_ref())
    }
}
