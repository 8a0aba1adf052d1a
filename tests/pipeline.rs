//! End-to-end: parse, search, transmit the marked tree, report errors.

use treewright::lst::parser::JavaParser;
use treewright::lst::rpc::{RpcBatch, TreeReceiver, TreeSender};
use treewright::lst::Codegen;
use treewright::recipe::search::{FindLeakingLocals, FindMethods};
use treewright::recipe::{ExecutionContext, RecipeRunner};
use treewright::{OutputErrorCode, RunConfig, TreewrightError};

const SOURCE: &str = "class Cache {
    Object last;

    // Keeps the newest value around.
    Object remember() {
        Object value = new Object();
        last = value;
        return value;
    }
}
";

#[test]
fn marked_tree_survives_transfer() -> Result<(), TreewrightError> {
    let units = JavaParser::new().parse(&[("Cache.java", SOURCE)])?;
    let ctx = ExecutionContext::new(RunConfig::sequential());
    let run = RecipeRunner::run(&FindLeakingLocals, &units, &ctx)?;
    let marked = run.after_trees().next().expect("nothing marked").clone();

    let mut sender = TreeSender::new();
    let mut receiver = TreeReceiver::new();
    let wire = serde_json::to_string(&sender.send(&marked)?).expect("encode");
    let batch: RpcBatch = serde_json::from_str(&wire).expect("decode");
    let received = receiver.receive(batch)?;

    assert_eq!(received.print(), marked.print());
    assert!(received
        .print()
        .contains("return /*~~(returned)~~>*/value;"));
    Ok(())
}

#[test]
fn bad_patterns_stop_before_any_tree_is_visited() {
    let err: TreewrightError = FindMethods::new("Cache remember(", false)
        .map(|_| ())
        .unwrap_err()
        .into();
    assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::InvalidPattern);
}
