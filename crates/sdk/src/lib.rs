//! SDK acquisition for golane.
//!
//! Resolves a versioned Go SDK distribution for the host platform:
//! looks the archive up in the remote catalog, downloads and validates
//! it, unpacks the distribution's `go/` folder into the local store,
//! and hands back the toolchain root. [`ToolchainLocator`] is the
//! entry point; it serializes concurrent resolutions within the
//! process and short-circuits on a configured root or a cache hit.

pub mod archive;
pub mod catalog;
mod error;

mod acquire;
mod locate;

pub use acquire::SdkAcquirer;
pub use error::{Error, Result};
pub use locate::ToolchainLocator;

/// Archive extensions the catalog is scanned for, in preference order.
pub const ALLOWED_EXTENSIONS: &[&str] = &["tar.gz", "zip"];

/// Top-level folder inside every Go SDK archive.
pub const FOLDER_IN_ARCHIVE: &str = "go";
