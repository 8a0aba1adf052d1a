//! Two-phase recipe execution.
//!
//! [`RecipeRunner::run`] drives a recipe over a set of source files:
//!
//! 1. **scan**: every file is visited by the recipe's scanner, filling the
//!    accumulator. Skipped entirely for recipes without a scan.
//! 2. **transform**: every file is visited by the recipe's visitor. The
//!    transform phase starts only after every scanner has returned, so no
//!    visitor observes a partially-built accumulator.
//!
//! With [`RunConfig::parallel`](treewright_core::RunConfig) each phase fans
//! out one file per task over a rayon pool. A single file is always visited
//! on one thread. Results keep the input order either way.
//!
//! Errors confined to one file are recorded on the [`ExecutionContext`] and
//! the run moves on. Cancellation stops scheduling files; visits already in
//! flight finish.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, info_span};
use treewright_lst::{Cursor, Tree};

use crate::context::ExecutionContext;
use crate::error::RecipeError;
use crate::recipe::ScanningRecipe;
use crate::result::{RecipeResult, RunResult};
use crate::SourceFile;

pub struct RecipeRunner;

impl RecipeRunner {
    /// Run `recipe` over `sources`.
    ///
    /// Returns [`RecipeError::Cancelled`] when the context was cancelled
    /// before every file was transformed. `completed` counts the files whose
    /// transform ran; it is zero when the scan phase was interrupted.
    pub fn run<R>(
        recipe: &R,
        sources: &[SourceFile],
        ctx: &ExecutionContext,
    ) -> Result<RunResult, RecipeError>
    where
        R: ScanningRecipe + ?Sized,
    {
        let _recipe_span = info_span!("recipe", name = recipe.name()).entered();
        let total = sources.len();
        let pool = Self::pool(ctx)?;

        let acc = recipe.initial_value(ctx);
        if recipe.scans() {
            let _scan_span = info_span!("scan", trees = total).entered();
            Self::each(pool.as_ref(), sources, |unit| {
                if ctx.is_cancelled() {
                    return;
                }
                debug!(path = %unit.source_path.display(), "scanning");
                let mut worker = ctx.clone();
                let mut cursor = Cursor::new();
                recipe
                    .scanner(&acc)
                    .visit(Tree::CompilationUnit(unit.clone()), &mut cursor, &mut worker);
            });
            if ctx.is_cancelled() {
                info!("cancelled during scan");
                return Err(RecipeError::Cancelled {
                    completed: 0,
                    total,
                });
            }
        }

        let completed = AtomicUsize::new(0);
        let changes = {
            let _transform_span = info_span!("transform", trees = total).entered();
            Self::each(pool.as_ref(), sources, |unit| {
                if ctx.is_cancelled() {
                    return None;
                }
                debug!(path = %unit.source_path.display(), "transforming");
                let mut worker = ctx.clone();
                let mut cursor = Cursor::new();
                let before = Tree::CompilationUnit(unit.clone());
                let after = recipe
                    .visitor(&acc)
                    .visit(before.clone(), &mut cursor, &mut worker);
                completed.fetch_add(1, Ordering::SeqCst);
                Self::change(unit, &before, after, ctx)
            })
        };

        let completed = completed.into_inner();
        if completed < total && ctx.is_cancelled() {
            info!(completed, total, "cancelled during transform");
            return Err(RecipeError::Cancelled { completed, total });
        }

        let results: Vec<RecipeResult> = changes.into_iter().flatten().collect();
        info!(changed = results.len(), total, "recipe finished");
        Ok(RunResult { results })
    }

    /// The pool for a parallel run, or `None` to run on the calling thread.
    fn pool(ctx: &ExecutionContext) -> Result<Option<ThreadPool>, RecipeError> {
        let config = ctx.config();
        if !config.parallel {
            return Ok(None);
        }
        ThreadPoolBuilder::new()
            .num_threads(config.max_threads.unwrap_or(0))
            .build()
            .map(Some)
            .map_err(|e| RecipeError::ThreadPool(e.to_string()))
    }

    /// Apply `f` to every source, on the pool when there is one, keeping
    /// input order in the output.
    fn each<T, F>(pool: Option<&ThreadPool>, sources: &[SourceFile], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&SourceFile) -> T + Sync + Send,
    {
        match pool {
            Some(pool) => pool.install(|| sources.par_iter().map(&f).collect()),
            None => sources.iter().map(f).collect(),
        }
    }

    /// Classify what the transform did to one file.
    fn change(
        unit: &SourceFile,
        before: &Tree,
        after: Option<Tree>,
        ctx: &ExecutionContext,
    ) -> Option<RecipeResult> {
        match after {
            None => {
                debug!(path = %unit.source_path.display(), "deleted");
                Some(RecipeResult {
                    before: unit.clone(),
                    after: None,
                })
            }
            Some(after) if after.ptr_eq(before) => None,
            Some(Tree::CompilationUnit(after)) => {
                debug!(path = %unit.source_path.display(), "changed");
                Some(RecipeResult {
                    before: unit.clone(),
                    after: Some(after),
                })
            }
            Some(other) => {
                let err = RecipeError::UnexpectedRoot {
                    path: unit.source_path.clone(),
                    kind: other.kind(),
                };
                ctx.on_error(&unit.source_path, err.to_string());
                None
            }
        }
    }
}
