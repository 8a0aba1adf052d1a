//! Tracing initialisation.
//!
//! Library crates only emit events; an application installs a subscriber
//! once, early, with [`init_tracing`]. `RUST_LOG` overrides the requested
//! level when set.

use std::io;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::error::TreewrightError;

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

fn filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()))
}

/// Install the global subscriber: span close events, no targets, stderr.
///
/// Panics if a global subscriber is already installed; see
/// [`try_init_tracing`].
pub fn init_tracing(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Like [`init_tracing`], but reports an already-installed subscriber as an
/// error.
pub fn try_init_tracing(level: LogLevel) -> Result<(), TreewrightError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| TreewrightError::Configuration {
            message: format!("cannot install tracing subscriber: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_convert() {
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
        assert_eq!(LogLevel::default().to_tracing_level(), tracing::Level::WARN);
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_second_install_is_an_error() {
        // Whichever call wins the race installs; the other must fail cleanly.
        let first = try_init_tracing(LogLevel::Warn);
        let second = try_init_tracing(LogLevel::Warn);
        assert!(first.is_err() || second.is_err());
    }
}
