//! Core types for golane.
//!
//! This crate holds what every other golane crate needs: the error
//! taxonomy shared across the workspace, the [`Settings`] struct with
//! its environment-variable fallback rules, and the platform resolver
//! that synthesizes the canonical SDK base name.

mod error;
pub mod platform;
pub mod settings;

pub use error::{Error, Result};
pub use settings::Settings;

/// Emit a progress message at info level when verbose mode is on,
/// at debug level otherwise.
pub fn log_optionally(verbose: bool, message: &str) {
    if verbose {
        tracing::info!("{message}");
    } else {
        tracing::debug!("{message}");
    }
}
