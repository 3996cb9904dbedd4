//! Error types for supervised execution.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for golane-exec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing the environment or running
/// the go tool.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The resolved tool path does not point at a regular file.
    #[error("Can't find executable file: {path}")]
    #[diagnostic(code(golane_exec::tool::not_found))]
    ExecutableNotFound {
        /// The path that was checked.
        path: PathBuf,
    },

    /// The subprocess finished with a non-zero exit code.
    #[error("Process exit code: {code}")]
    #[diagnostic(code(golane_exec::process::exit))]
    NonZeroExit {
        /// The exit code reported by the subprocess.
        code: i32,
    },

    /// The retry predicate kept requesting attempts past the ceiling.
    #[error("Too many iterations detected, may be some loop: {iterations}")]
    #[diagnostic(code(golane_exec::process::loop_guard))]
    LoopGuard {
        /// Number of completed attempts when the guard tripped.
        iterations: u32,
    },

    /// SDK resolution or acquisition failure.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Sdk(#[from] golane_sdk::Error),

    /// Core configuration or I/O failure.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] golane_core::Error),
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Core(golane_core::Error::io(source, None, "process execution"))
    }
}
