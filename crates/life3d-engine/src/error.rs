//! Error types for the headless driver.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup, the run, and output writing.

use std::path::PathBuf;

/// Top-level error for the `life3d-engine` binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: life3d_core::ConfigError,
    },

    /// The run loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: life3d_core::runner::RunnerError,
    },

    /// Creating or writing an output file failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// The file or directory being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Encoding a snapshot or report as JSON failed.
    #[error("JSON encoding error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },
}
