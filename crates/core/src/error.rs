//! Error types shared across the golane workspace.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for golane-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by core configuration and filesystem handling.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Bad or missing required setting.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(golane::config::invalid))]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// I/O failure with path context.
    #[error("I/O error during {operation}: {source}")]
    #[diagnostic(code(golane::io::error))]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// The path where the failure occurred, if applicable.
        path: Option<Box<std::path::Path>>,
        /// Description of the operation that failed.
        operation: String,
    },
}

impl Error {
    /// Create a configuration error with a message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io(source: std::io::Error, path: Option<PathBuf>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.map(|p| p.into_boxed_path()),
            operation: operation.into(),
        }
    }
}
