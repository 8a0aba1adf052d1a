//! Two-phase execution, result classification and cancellation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use treewright_core::{Marker, MarkerKind, RunConfig};
use treewright_lst::parser::JavaParser;
use treewright_lst::visitor::VisitResult;
use treewright_lst::{Codegen, CompilationUnit, Cursor, Tree, TreeKind, TreeVisitor};
use treewright_recipe::search::FindMethods;
use treewright_recipe::{
    ExecutionContext, MarkFilesInModulesContaining, Recipe, RecipeError, RecipeRunner,
    RecipeVisitor, ScanningRecipe, SourceFile,
};

fn parse(files: &[(&str, &str)]) -> Vec<SourceFile> {
    JavaParser::new().parse(files).expect("parse failed")
}

fn sequential() -> ExecutionContext {
    ExecutionContext::new(RunConfig::sequential())
}

fn search_description(unit: &CompilationUnit) -> Option<String> {
    unit.markers
        .find(MarkerKind::SearchResult)
        .and_then(Marker::description)
        .map(str::to_string)
}

// ============================================================================
// A scanning recipe that counts files, then stamps the count on each file
// ============================================================================

struct CountFiles;

struct Counter<'a>(&'a AtomicUsize);

impl TreeVisitor<ExecutionContext> for Counter<'_> {
    fn pre_visit(
        &mut self,
        tree: &Tree,
        _cursor: &mut Cursor,
        _ctx: &mut ExecutionContext,
    ) -> VisitResult {
        if tree.kind() == TreeKind::CompilationUnit {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        VisitResult::SkipChildren
    }
}

struct Stamp<'a>(&'a AtomicUsize);

impl TreeVisitor<ExecutionContext> for Stamp<'_> {
    fn visit_compilation_unit(
        &mut self,
        node: Arc<CompilationUnit>,
        _cursor: &mut Cursor,
        _ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        let seen = self.0.load(Ordering::SeqCst);
        Some(Tree::CompilationUnit(node).with_search_result(Some(format!("seen {}", seen))))
    }
}

impl ScanningRecipe for CountFiles {
    type Accumulator = AtomicUsize;

    fn name(&self) -> &str {
        "count-files"
    }

    fn initial_value(&self, _ctx: &ExecutionContext) -> AtomicUsize {
        AtomicUsize::new(0)
    }

    fn scanner<'a>(&'a self, acc: &'a AtomicUsize) -> RecipeVisitor<'a> {
        Box::new(Counter(acc))
    }

    fn visitor<'a>(&'a self, acc: &'a AtomicUsize) -> RecipeVisitor<'a> {
        Box::new(Stamp(acc))
    }
}

fn three_files() -> Vec<SourceFile> {
    parse(&[
        ("A.java", "class A {}\n"),
        ("B.java", "class B {}\n"),
        ("C.java", "class C {}\n"),
    ])
}

#[test]
fn transform_sees_the_complete_accumulator() {
    for config in [RunConfig::sequential(), RunConfig::default()] {
        let ctx = ExecutionContext::new(config);
        let run = RecipeRunner::run(&CountFiles, &three_files(), &ctx).unwrap();

        assert_eq!(run.results.len(), 3);
        for result in &run.results {
            let after = result.after.as_ref().unwrap();
            assert_eq!(search_description(after).as_deref(), Some("seen 3"));
        }
    }
}

#[test]
fn results_keep_input_order() {
    let ctx = ExecutionContext::default();
    let run = RecipeRunner::run(&CountFiles, &three_files(), &ctx).unwrap();
    let paths: Vec<String> = run
        .changed_paths()
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    assert_eq!(paths, vec!["A.java", "B.java", "C.java"]);
}

// ============================================================================
// Modules
// ============================================================================

fn project() -> Vec<SourceFile> {
    parse(&[
        ("app/src/main/java/App.java", "class App {}\n"),
        ("app/src/main/java/Marker.java", "class Marker {}\n"),
        ("lib/src/main/java/Lib.java", "class Lib {}\n"),
    ])
}

#[test]
fn modules_containing_a_match_are_marked() {
    let recipe = MarkFilesInModulesContaining::new("**/Marker.java").unwrap();
    let run = RecipeRunner::run(&recipe, &project(), &sequential()).unwrap();

    let paths: Vec<String> = run
        .changed_paths()
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    assert_eq!(
        paths,
        vec!["app/src/main/java/App.java", "app/src/main/java/Marker.java"]
    );
    assert!(run.results[0].diff().contains("+/*~~>*/class App {}"));
}

#[test]
fn marking_twice_adds_nothing() {
    let recipe = MarkFilesInModulesContaining::new("**/Marker.java").unwrap();
    let sources = project();
    let first = RecipeRunner::run(&recipe, &sources, &sequential()).unwrap();

    // Feed the marked trees back in, with the untouched file.
    let mut marked: Vec<SourceFile> = first.after_trees().cloned().collect();
    marked.push(sources[2].clone());
    let second = RecipeRunner::run(&recipe, &marked, &sequential()).unwrap();

    assert!(second.is_empty());
    for unit in &marked[..2] {
        assert_eq!(unit.markers.find_all(MarkerKind::SearchResult).count(), 1);
    }
}

// ============================================================================
// Result classification
// ============================================================================

struct DeleteNamed(&'static str);

struct Deleter(&'static str);

impl TreeVisitor<ExecutionContext> for Deleter {
    fn visit_compilation_unit(
        &mut self,
        node: Arc<CompilationUnit>,
        _cursor: &mut Cursor,
        _ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        if node.source_path.ends_with(self.0) {
            None
        } else {
            Some(Tree::CompilationUnit(node))
        }
    }
}

impl Recipe for DeleteNamed {
    fn name(&self) -> &str {
        "delete-named"
    }

    fn visitor(&self) -> RecipeVisitor<'_> {
        Box::new(Deleter(self.0))
    }
}

#[test]
fn unchanged_files_are_not_reported_and_deletions_are() {
    let sources = parse(&[
        ("Keep.java", "class Keep {}\n"),
        ("Gone.java", "class Gone {}\n"),
    ]);
    let run = RecipeRunner::run(&DeleteNamed("Gone.java"), &sources, &sequential()).unwrap();

    assert_eq!(run.results.len(), 1);
    let result = &run.results[0];
    assert!(result.is_deletion());
    assert_eq!(result.path().display().to_string(), "Gone.java");
    assert!(result.diff().contains("-class Gone {}"));
}

/// Replaces each compilation unit with its first class.
struct Unwrap;

struct FirstClass;

impl TreeVisitor<ExecutionContext> for FirstClass {
    fn visit_compilation_unit(
        &mut self,
        node: Arc<CompilationUnit>,
        _cursor: &mut Cursor,
        _ctx: &mut ExecutionContext,
    ) -> Option<Tree> {
        node.classes.first().cloned()
    }
}

impl Recipe for Unwrap {
    fn name(&self) -> &str {
        "unwrap"
    }

    fn visitor(&self) -> RecipeVisitor<'_> {
        Box::new(FirstClass)
    }
}

#[test]
fn wrong_root_is_a_per_file_error() {
    let ctx = sequential();
    let run = RecipeRunner::run(&Unwrap, &three_files(), &ctx).unwrap();

    assert!(run.is_empty());
    let errors = ctx.source_errors();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[0].path.display().to_string(), "A.java");
    assert!(errors[0].message.contains("ClassDeclaration"));
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn fail_fast_stops_scheduling_after_first_error() {
    let ctx = ExecutionContext::new(RunConfig {
        fail_fast: true,
        ..RunConfig::sequential()
    });
    let err = RecipeRunner::run(&Unwrap, &three_files(), &ctx).unwrap_err();

    assert!(matches!(
        err,
        RecipeError::Cancelled {
            completed: 1,
            total: 3
        }
    ));
    assert_eq!(ctx.source_errors().len(), 1);
}

#[test]
fn cancelled_scan_never_transforms() {
    let ctx = sequential();
    ctx.cancel();
    let err = RecipeRunner::run(&CountFiles, &three_files(), &ctx).unwrap_err();
    assert!(matches!(
        err,
        RecipeError::Cancelled {
            completed: 0,
            total: 3
        }
    ));
}

// ============================================================================
// Parallel runs
// ============================================================================

#[test]
fn parallel_and_sequential_runs_agree() {
    let files: Vec<(String, String)> = (0..8)
        .map(|i| {
            (
                format!("C{}.java", i),
                format!(
                    "class C{i} {{\n    void f() {{ g(); }}\n    void g() {{}}\n}}\n",
                    i = i
                ),
            )
        })
        .collect();
    let borrowed: Vec<(&str, &str)> = files
        .iter()
        .map(|(p, s)| (p.as_str(), s.as_str()))
        .collect();
    let sources = parse(&borrowed);
    let recipe = FindMethods::new("*..* g()", false).unwrap();

    let printed = |config: RunConfig| -> Vec<String> {
        let ctx = ExecutionContext::new(config);
        RecipeRunner::run(&recipe, &sources, &ctx)
            .unwrap()
            .after_trees()
            .map(|unit| unit.print())
            .collect()
    };

    let sequential = printed(RunConfig::sequential());
    let parallel = printed(RunConfig {
        max_threads: Some(4),
        ..RunConfig::default()
    });
    assert_eq!(sequential.len(), 8);
    assert_eq!(sequential, parallel);
    assert!(sequential[0].contains("{ /*~~>*/g(); }"));
}
