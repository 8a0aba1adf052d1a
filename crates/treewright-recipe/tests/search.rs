//! Built-in search recipes over parsed source.

use treewright_core::{Marker, MarkerKind, RunConfig};
use treewright_lst::parser::JavaParser;
use treewright_lst::visitor;
use treewright_lst::{Codegen, PrintOptions, Tree, TreeKind};
use treewright_recipe::search::{
    FindAnnotations, FindLeakingLocals, FindMethods, FindMissingTypes, FindTypes,
};
use treewright_recipe::{ExecutionContext, RecipeError, RecipeRunner, RunResult, ScanningRecipe, SourceFile};

const HOLDER: &str = "package p;

import java.util.ArrayList;
import java.util.List;

class Holder {
    List<String> names;
    ArrayList<String> items;
    int count;

    @SuppressWarnings(\"unchecked\")
    void fill() {
        names.add(\"a\");
        names.add(0, \"b\");
        items.add(\"c\");
    }

    @Deprecated(since = \"1.2\", forRemoval = true)
    void old() {
    }
}
";

fn parse(path: &str, source: &str) -> Vec<SourceFile> {
    JavaParser::new()
        .parse(&[(path, source)])
        .expect("parse failed")
}

fn run<R: ScanningRecipe>(recipe: &R, sources: &[SourceFile]) -> RunResult {
    let ctx = ExecutionContext::new(RunConfig::sequential());
    RecipeRunner::run(recipe, sources, &ctx).expect("run failed")
}

/// The nodes carrying a search result in the single changed file.
fn marked(result: &RunResult) -> Vec<Tree> {
    assert_eq!(result.results.len(), 1);
    let after = result.results[0].after.clone().expect("file was deleted");
    visitor::collect(&Tree::CompilationUnit(after), |tree, _| {
        tree.markers()
            .has(MarkerKind::SearchResult)
            .then(|| tree.clone())
    })
}

#[test]
fn find_types_marks_type_names_only() {
    let sources = parse("p/Holder.java", HOLDER);
    let recipe = FindTypes::new("java.util.List", false).unwrap();
    let found = marked(&run(&recipe, &sources));

    // The declared type of `names`; not the import, not `names.add`.
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind(), TreeKind::Identifier);
    assert_eq!(found[0].simple_name(), Some("List"));
}

#[test]
fn find_types_with_subtypes() {
    let sources = parse("p/Holder.java", HOLDER);
    let recipe = FindTypes::new("java.util.Collection", true).unwrap();
    let names: Vec<String> = marked(&run(&recipe, &sources))
        .iter()
        .filter_map(|t| t.simple_name().map(str::to_string))
        .collect();
    assert_eq!(names, vec!["List", "ArrayList"]);
}

#[test]
fn find_types_skips_files_without_the_type() {
    let sources = parse("A.java", "class A { int x; }\n");
    let recipe = FindTypes::new("java.util.List", false).unwrap();
    assert!(run(&recipe, &sources).is_empty());
}

#[test]
fn find_methods_marks_calls() {
    let sources = parse("p/Holder.java", HOLDER);

    let exact = FindMethods::new("java.util.List add(..)", false).unwrap();
    assert_eq!(marked(&run(&exact, &sources)).len(), 2);

    let overrides = FindMethods::new("java.util.List add(..)", true).unwrap();
    let result = run(&overrides, &sources);
    assert_eq!(marked(&result).len(), 3);
    assert!(result.results[0]
        .diff()
        .contains("+        /*~~>*/items.add(\"c\");"));
}

#[test]
fn find_methods_marks_declarations() {
    let sources = parse("p/Holder.java", HOLDER);
    let recipe = FindMethods::new("p.Holder fill()", false).unwrap();
    let found = marked(&run(&recipe, &sources));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind(), TreeKind::MethodDeclaration);
}

#[test]
fn find_annotations_by_argument() {
    let sources = parse("p/Holder.java", HOLDER);
    let recipe = FindAnnotations::new("@java.lang.Deprecated(forRemoval = true)").unwrap();
    let found = marked(&run(&recipe, &sources));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind(), TreeKind::Annotation);

    let none = FindAnnotations::new("@java.lang.Deprecated(since = \"2.0\")").unwrap();
    assert!(run(&none, &sources).is_empty());
}

#[test]
fn malformed_pattern_fails_before_running() {
    let err = FindMethods::new("java.util.List add(", false).unwrap_err();
    assert!(matches!(err, RecipeError::Pattern(_)));
    assert!(err.to_string().contains("java.util.List add("));
}

#[test]
fn searching_twice_adds_nothing() {
    let sources = parse("p/Holder.java", HOLDER);
    let recipe = FindMethods::new("java.util.List add(..)", true).unwrap();
    let first = run(&recipe, &sources);
    let marked_once: Vec<SourceFile> = first.after_trees().cloned().collect();
    assert!(run(&recipe, &marked_once).is_empty());
}

#[test]
fn missing_types_are_reported() {
    let sources = parse(
        "A.java",
        "class A {\n    Unknown u;\n    void f() { missing(); }\n}\n",
    );
    let mut findings: Vec<String> = FindMissingTypes::find(&sources[0])
        .into_iter()
        .map(|(_, description)| description)
        .collect();
    findings.sort();
    assert_eq!(
        findings,
        vec![
            "method invocation has no method type",
            "variable type is unresolved",
        ]
    );

    let result = run(&FindMissingTypes, &sources);
    let verbose = result.results[0].diff_with(&PrintOptions::verbose());
    assert!(verbose.contains("/*~~(missing type: method invocation has no method type)~~>*/missing()"));
    // Diagnostics are invisible in default printing.
    let after = result.results[0].after.as_ref().unwrap();
    assert_eq!(after.print(), sources[0].print());
}

#[test]
fn attributed_source_has_no_missing_types() {
    let sources = parse("p/Holder.java", HOLDER);
    assert!(FindMissingTypes::find(&sources[0]).is_empty());
    assert!(run(&FindMissingTypes, &sources).is_empty());
}

#[test]
fn leaking_locals_say_how_they_leak() {
    let sources = parse(
        "A.java",
        "class A {\n    Object field;\n    Object f() { Object a = new Object(); Object b = new Object(); field = b; return a; }\n}\n",
    );
    let result = run(&FindLeakingLocals, &sources);
    let after = result.results[0].after.as_ref().unwrap().print();
    assert!(after.contains("field = /*~~(assigned to a non-local)~~>*/b;"));
    assert!(after.contains("return /*~~(returned)~~>*/a;"));

    let descriptions: Vec<String> = marked(&result)
        .iter()
        .filter_map(|t| {
            t.markers()
                .find(MarkerKind::SearchResult)
                .and_then(Marker::description)
                .map(str::to_string)
        })
        .collect();
    assert_eq!(descriptions.len(), 2);
}
