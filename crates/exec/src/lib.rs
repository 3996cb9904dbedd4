//! Supervised execution of the go tool for golane.
//!
//! Takes a resolved toolchain root from `golane-sdk`, composes the
//! subprocess environment (GOROOT, GOPATH, target overrides, user
//! pairs), and drives the go tool through a bounded retry loop.
//! [`Supervisor`] is the entry point; [`GoCommand`] names the
//! subcommand and [`RetryPolicy`] decides whether a finished run
//! warrants another attempt.

pub mod commands;
pub mod env;
mod error;
mod supervisor;

pub use commands::GoCommand;
pub use env::{ExecutionRequest, compose_environment};
pub use error::{Error, Result};
pub use supervisor::{
    ExecutionResult, Lifecycle, MAX_RETRY_ITERATIONS, NoHooks, NoRetry, RetryPolicy, Supervisor,
};
