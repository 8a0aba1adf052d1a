//! Shared state for one recipe run.
//!
//! An [`ExecutionContext`] is a cheap handle: clones share the same message
//! map, error list and cancellation flag, so every worker of a parallel
//! phase gets its own clone to pass as the visitor parameter.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use serde_json::Value;
use tracing::warn;
use treewright_core::RunConfig;

/// An error confined to one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Default)]
struct Shared {
    config: RunConfig,
    messages: DashMap<String, Value>,
    errors: Mutex<Vec<SourceError>>,
    cancelled: AtomicBool,
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    shared: Arc<Shared>,
}

impl ExecutionContext {
    pub fn new(config: RunConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                ..Shared::default()
            }),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.shared.config
    }

    // ------------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------------

    /// Store a run-wide message, replacing any previous value.
    pub fn put_message(&self, key: impl Into<String>, value: Value) {
        self.shared.messages.insert(key.into(), value);
    }

    pub fn get_message(&self, key: &str) -> Option<Value> {
        self.shared.messages.get(key).map(|v| v.value().clone())
    }

    /// The message under `key`, computing and storing it first if absent.
    /// Concurrent callers see exactly one computed value.
    pub fn compute_message_if_absent(&self, key: &str, compute: impl FnOnce() -> Value) -> Value {
        self.shared
            .messages
            .entry(key.to_string())
            .or_insert_with(compute)
            .value()
            .clone()
    }

    pub fn remove_message(&self, key: &str) -> Option<Value> {
        self.shared.messages.remove(key).map(|(_, v)| v)
    }

    // ------------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------------

    /// Record an error for one source file. The run continues with the next
    /// file unless `fail_fast` is set, in which case the run is cancelled.
    pub fn on_error(&self, path: &Path, message: impl Into<String>) {
        let message = message.into();
        warn!(path = %path.display(), %message, "error in source file");
        self.errors().push(SourceError {
            path: path.to_path_buf(),
            message,
        });
        if self.shared.config.fail_fast {
            self.cancel();
        }
    }

    /// Errors recorded so far, in the order they were reported.
    pub fn source_errors(&self) -> Vec<SourceError> {
        self.errors().clone()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    fn errors(&self) -> MutexGuard<'_, Vec<SourceError>> {
        // A panicking visitor cannot leave the list half-written.
        match self.shared.errors.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // ------------------------------------------------------------------------
    // Cancellation
    // ------------------------------------------------------------------------

    /// Stop scheduling further source files. Visits already in flight finish.
    pub fn cancel(&self) {
        self.shared.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clones_share_state() {
        let ctx = ExecutionContext::default();
        let worker = ctx.clone();
        worker.put_message("seen", json!(3));
        worker.on_error(Path::new("A.java"), "boom");
        worker.cancel();

        assert_eq!(ctx.get_message("seen"), Some(json!(3)));
        assert_eq!(
            ctx.source_errors(),
            vec![SourceError {
                path: PathBuf::from("A.java"),
                message: "boom".to_string(),
            }]
        );
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn test_compute_message_if_absent_keeps_first_value() {
        let ctx = ExecutionContext::default();
        assert_eq!(ctx.compute_message_if_absent("k", || json!("a")), json!("a"));
        assert_eq!(ctx.compute_message_if_absent("k", || json!("b")), json!("a"));
        assert_eq!(ctx.remove_message("k"), Some(json!("a")));
        assert_eq!(ctx.get_message("k"), None);
    }

    #[test]
    fn test_fail_fast_cancels_on_first_error() {
        let lenient = ExecutionContext::new(RunConfig::sequential());
        lenient.on_error(Path::new("A.java"), "boom");
        assert!(lenient.has_errors());
        assert!(!lenient.is_cancelled());

        let strict = ExecutionContext::new(RunConfig {
            fail_fast: true,
            ..RunConfig::sequential()
        });
        strict.on_error(Path::new("A.java"), "boom");
        assert!(strict.is_cancelled());
    }
}
