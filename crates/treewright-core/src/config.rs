//! Run configuration.
//!
//! A [`RunConfig`] controls how a recipe run is scheduled and how markers are
//! rendered in printed output. Every field has a default, so a partial JSON
//! document (or `{}`) is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TreewrightError;

/// How markers are rendered when a tree is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPrinting {
    /// Search results print as `/*~~>*/` or `/*~~(description)~~>*/`.
    #[default]
    Default,
    /// Markers are omitted; output is the exact source.
    Sanitized,
    /// Every marker prints, including diagnostics and provenance.
    Verbose,
}

/// Configuration for a recipe run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Fan the scan and transform phases out over a thread pool.
    pub parallel: bool,
    /// Upper bound on worker threads when `parallel` is set.
    pub max_threads: Option<usize>,
    /// Marker rendering used when producing diffs.
    pub marker_printing: MarkerPrinting,
    /// Stop scheduling remaining trees after the first per-tree error.
    pub fail_fast: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_threads: None,
            marker_printing: MarkerPrinting::Default,
            fail_fast: false,
        }
    }
}

impl RunConfig {
    /// A sequential configuration, used by tests that assert on ordering.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, TreewrightError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, TreewrightError> {
        let text = std::fs::read_to_string(path).map_err(|e| TreewrightError::Configuration {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        let config = Self::from_json_str(&text)?;
        debug!(path = %path.display(), ?config, "loaded run configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_json_is_default() {
        let config = RunConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RunConfig::default());
        assert!(config.parallel);
    }

    #[test]
    fn test_partial_json() {
        let config =
            RunConfig::from_json_str(r#"{"parallel": false, "marker_printing": "sanitized"}"#)
                .unwrap();
        assert!(!config.parallel);
        assert_eq!(config.marker_printing, MarkerPrinting::Sanitized);
        assert_eq!(config.max_threads, None);
    }

    #[test]
    fn test_invalid_json_is_configuration_error() {
        let err = RunConfig::from_json_str(r#"{"parallel": "yes"}"#).unwrap_err();
        assert!(matches!(err, TreewrightError::Configuration { .. }));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_threads": 2, "fail_fast": true}}"#).unwrap();
        let config = RunConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.max_threads, Some(2));
        assert!(config.fail_fast);
    }

    #[test]
    fn test_missing_file() {
        let err = RunConfig::from_json_file(Path::new("/nonexistent/treewright.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
