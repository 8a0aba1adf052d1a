//! The recipe contracts.
//!
//! A [`Recipe`] is a single transform pass: the runner asks it for a fresh
//! visitor per source file. A [`ScanningRecipe`] adds a read-only scan pass
//! over every source file that fills an accumulator before any transform
//! visitor is created. Every `Recipe` is also a `ScanningRecipe` whose scan
//! is skipped.

use treewright_lst::visitor::TreeVisitor;

use crate::context::ExecutionContext;

/// A visitor the runner drives over one source file.
pub type RecipeVisitor<'a> = Box<dyn TreeVisitor<ExecutionContext> + 'a>;

pub trait Recipe: Sync {
    /// A stable, human-readable identifier, used in logs.
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// A fresh visitor for one source file.
    fn visitor(&self) -> RecipeVisitor<'_>;
}

pub trait ScanningRecipe: Sync {
    /// Shared state built by the scan phase. Scanners of different source
    /// files may run concurrently, so it must be safe to fill through `&`.
    type Accumulator: Send + Sync;

    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn initial_value(&self, ctx: &ExecutionContext) -> Self::Accumulator;

    /// A read-only visitor that records facts about one source file. Any
    /// tree it returns is discarded.
    fn scanner<'a>(&'a self, acc: &'a Self::Accumulator) -> RecipeVisitor<'a>;

    /// A visitor for one source file, consulting the complete accumulator.
    fn visitor<'a>(&'a self, acc: &'a Self::Accumulator) -> RecipeVisitor<'a>;

    /// Whether the runner needs to run the scan phase at all.
    fn scans(&self) -> bool {
        true
    }
}

/// A scanner that looks at nothing.
struct NoScan;

impl TreeVisitor<ExecutionContext> for NoScan {}

impl<R: Recipe + ?Sized> ScanningRecipe for R {
    type Accumulator = ();

    fn name(&self) -> &str {
        Recipe::name(self)
    }

    fn description(&self) -> &str {
        Recipe::description(self)
    }

    fn initial_value(&self, _ctx: &ExecutionContext) {}

    fn scanner<'a>(&'a self, _acc: &'a ()) -> RecipeVisitor<'a> {
        Box::new(NoScan)
    }

    fn visitor<'a>(&'a self, _acc: &'a ()) -> RecipeVisitor<'a> {
        Recipe::visitor(self)
    }

    fn scans(&self) -> bool {
        false
    }
}
