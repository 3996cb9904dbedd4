//! Error types for SDK acquisition.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for golane-sdk operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, downloading, or unpacking an
/// SDK distribution.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Remote endpoint answered with a non-success status.
    #[error("HTTP status {status} for {url}")]
    #[diagnostic(code(golane_sdk::network::status))]
    Network {
        /// The requested URL.
        url: String,
        /// The HTTP status code received.
        status: u16,
    },

    /// The archive response carried a disallowed content type.
    #[error("Unsupported archive content type: {content_type}")]
    #[diagnostic(code(golane_sdk::download::content_type))]
    ContentType {
        /// The Content-Type header value received.
        content_type: String,
    },

    /// The catalog document was not of the expected shape.
    #[error("Malformed SDK catalog: {message}")]
    #[diagnostic(code(golane_sdk::catalog::format))]
    Format {
        /// What was wrong with the document.
        message: String,
    },

    /// No catalog entry matched the synthesized base name.
    #[error("No SDK found for base name '{base_name}'")]
    #[diagnostic(code(golane_sdk::catalog::not_found))]
    NotFound {
        /// The base name that was searched for.
        base_name: String,
    },

    /// Unpacking extracted zero entries or failed midway.
    #[error("Unpack failed: {message}")]
    #[diagnostic(code(golane_sdk::archive::unpack))]
    Unpack {
        /// Description of the failure.
        message: String,
    },

    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    #[diagnostic(code(golane_sdk::network::transport))]
    Http(#[from] reqwest::Error),

    /// Core configuration or I/O failure.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] golane_core::Error),
}

impl Error {
    /// Create a network error for a URL and status code.
    pub fn network(url: impl Into<String>, status: u16) -> Self {
        Self::Network {
            url: url.into(),
            status,
        }
    }

    /// Create a content-type error.
    pub fn content_type(content_type: impl Into<String>) -> Self {
        Self::ContentType {
            content_type: content_type.into(),
        }
    }

    /// Create a catalog format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create a not-found error for a base name.
    pub fn not_found(base_name: impl Into<String>) -> Self {
        Self::NotFound {
            base_name: base_name.into(),
        }
    }

    /// Create an unpack error.
    pub fn unpack(message: impl Into<String>) -> Self {
        Self::Unpack {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Core(golane_core::Error::io(source, None, "sdk acquisition"))
    }
}
