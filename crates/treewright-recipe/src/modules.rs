//! Marking whole modules by what one of their files contains.

use std::path::{Component, Path};
use std::sync::Arc;

use dashmap::DashSet;
use globset::{Glob, GlobMatcher};
use tracing::debug;
use treewright_lst::visitor::VisitResult;
use treewright_lst::{CompilationUnit, Cursor, Tree, TreeVisitor};

use crate::context::ExecutionContext;
use crate::error::RecipeError;
use crate::recipe::{RecipeVisitor, ScanningRecipe};

/// The module a source path belongs to: the path components before the
/// first `src` directory, joined with `/`. Files outside any `src` tree
/// belong to the root module `""`.
pub fn module_of(path: &Path) -> String {
    let components: Vec<&str> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .collect();
    match components.iter().position(|&c| c == "src") {
        Some(i) => components[..i].join("/"),
        None => String::new(),
    }
}

/// Marks every file of a module in which at least one file path matches a
/// glob. The scan phase collects the matching modules, the transform phase
/// marks each compilation unit whose module was collected.
#[derive(Debug)]
pub struct MarkFilesInModulesContaining {
    glob: String,
    matcher: GlobMatcher,
}

impl MarkFilesInModulesContaining {
    pub fn new(glob: &str) -> Result<Self, RecipeError> {
        let matcher = Glob::new(glob)
            .map_err(|e| RecipeError::glob(glob, e))?
            .compile_matcher();
        Ok(Self {
            glob: glob.to_string(),
            matcher,
        })
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }
}

impl ScanningRecipe for MarkFilesInModulesContaining {
    type Accumulator = DashSet<String>;

    fn name(&self) -> &str {
        "mark-files-in-modules-containing"
    }

    fn description(&self) -> &str {
        "Mark every file in a module that contains a file matching a glob."
    }

    fn initial_value(&self, _ctx: &ExecutionContext) -> DashSet<String> {
        DashSet::new()
    }

    fn scanner<'a>(&'a self, acc: &'a DashSet<String>) -> RecipeVisitor<'a> {
        Box::new(ModuleScanner {
            matcher: &self.matcher,
            modules: acc,
        })
    }

    fn visitor<'a>(&'a self, acc: &'a DashSet<String>) -> RecipeVisitor<'a> {
        Box::new(ModuleMarker { modules: acc })
    }
}

struct ModuleScanner<'a> {
    matcher: &'a GlobMatcher,
    modules: &'a DashSet<String>,
}

impl TreeVisitor<ExecutionContext> for ModuleScanner<'_> {
    fn pre_visit(
        &mut self,
        _tree: &Tree,
        _cursor: &mut Cursor,
        _ctx: &mut ExecutionContext,
    ) -> VisitResult {
        VisitResult::SkipChildren
    }

    fn post_visit(
        &mut self,
        tree: Tree,
        _cursor: &mut Cursor,
        _ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        if let Some(unit) = tree.as_compilation_unit() {
            if self.matcher.is_match(&unit.source_path) {
                let module = module_of(&unit.source_path);
                debug!(path = %unit.source_path.display(), module = %module, "module matches");
                self.modules.insert(module);
            }
        }
        Some(tree)
    }
}

struct ModuleMarker<'a> {
    modules: &'a DashSet<String>,
}

impl TreeVisitor<ExecutionContext> for ModuleMarker<'_> {
    fn visit_compilation_unit(
        &mut self,
        node: Arc<CompilationUnit>,
        _cursor: &mut Cursor,
        _ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        let matched = self.modules.contains(&module_of(&node.source_path));
        let tree = Tree::CompilationUnit(node);
        Some(if matched {
            tree.with_search_result(None)
        } else {
            tree
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_of() {
        assert_eq!(module_of(Path::new("app/src/main/java/A.java")), "app");
        assert_eq!(
            module_of(Path::new("libs/core/src/main/java/B.java")),
            "libs/core"
        );
        assert_eq!(module_of(Path::new("src/C.java")), "");
        assert_eq!(module_of(Path::new("scripts/D.java")), "");
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let err = MarkFilesInModulesContaining::new("**/[.java").unwrap_err();
        assert!(matches!(err, RecipeError::Glob { .. }));
    }
}
