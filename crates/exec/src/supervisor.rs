//! Supervised go subprocess execution with a bounded retry loop.

use crate::commands::GoCommand;
use crate::env::{ExecutionRequest, compose_environment};
use crate::{Error, Result};
use golane_core::{Settings, log_optionally};
use golane_sdk::ToolchainLocator;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, error, info};

/// Retries allowed beyond the first run. The predicate asking for an
/// eleventh attempt is treated as a loop and aborted.
pub const MAX_RETRY_ITERATIONS: u32 = 10;

/// Outcome of a single subprocess run, rebuilt fresh per iteration.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Exit code, or -1 when the process was terminated by a signal.
    pub exit_code: i32,
    /// Everything the process wrote to stdout.
    pub stdout: Vec<u8>,
    /// Everything the process wrote to stderr.
    pub stderr: Vec<u8>,
}

impl ExecutionResult {
    /// Whether the run finished with exit code zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Decides after each run whether another attempt is warranted.
pub trait RetryPolicy: Send + Sync {
    /// Inspect a finished run and request a retry.
    fn needs_retry(&self, result: &ExecutionResult) -> bool;
}

/// Policy that never retries, the default.
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn needs_retry(&self, _result: &ExecutionResult) -> bool {
        false
    }
}

/// Hooks wrapped around a whole supervised invocation.
///
/// `after` always runs, whether the invocation succeeded or not.
pub trait Lifecycle: Send + Sync {
    /// Runs once before the toolchain is resolved.
    fn before(&self) -> Result<()> {
        Ok(())
    }

    /// Runs once after the invocation settles. `errored` is true when
    /// the invocation is returning an error.
    fn after(&self, _errored: bool) {}
}

/// Lifecycle with no hooks.
pub struct NoHooks;

impl Lifecycle for NoHooks {}

/// Resolves the toolchain once per invocation and drives the go tool
/// until the retry policy is satisfied or the ceiling is hit.
pub struct Supervisor {
    settings: Arc<Settings>,
    locator: ToolchainLocator,
}

impl Supervisor {
    /// Create a supervisor with its own toolchain locator.
    #[must_use]
    pub fn new(settings: Arc<Settings>) -> Self {
        let locator = ToolchainLocator::new(Arc::clone(&settings));
        Self { settings, locator }
    }

    /// Run a command with no lifecycle hooks.
    pub async fn run(
        &self,
        command: &GoCommand,
        tail_args: &[String],
        policy: &dyn RetryPolicy,
    ) -> Result<ExecutionResult> {
        self.run_with_hooks(command, tail_args, policy, &NoHooks).await
    }

    /// Run a command, bracketing the attempt loop with hooks.
    pub async fn run_with_hooks(
        &self,
        command: &GoCommand,
        tail_args: &[String],
        policy: &dyn RetryPolicy,
        hooks: &dyn Lifecycle,
    ) -> Result<ExecutionResult> {
        hooks.before()?;
        let outcome = self.run_inner(command, tail_args, policy).await;
        hooks.after(outcome.is_err());
        outcome
    }

    async fn run_inner(
        &self,
        command: &GoCommand,
        tail_args: &[String],
        policy: &dyn RetryPolicy,
    ) -> Result<ExecutionResult> {
        let root = self.locator.locate().await?;

        let mut iterations: u32 = 0;
        loop {
            // Only root resolution is cached across attempts; the
            // executable check and environment are redone each time.
            let request = self.prepare(&root, command, tail_args)?;
            let result = launch(&request).await?;
            iterations += 1;
            self.log_output(command, &result);

            if policy.needs_retry(&result) {
                if iterations > MAX_RETRY_ITERATIONS {
                    return Err(Error::LoopGuard { iterations });
                }
                debug!(iterations, "retry requested by policy, relaunching");
                continue;
            }

            if result.exit_code != 0 {
                return Err(Error::NonZeroExit {
                    code: result.exit_code,
                });
            }
            return Ok(result);
        }
    }

    fn prepare(
        &self,
        root: &Path,
        command: &GoCommand,
        tail_args: &[String],
    ) -> Result<ExecutionRequest> {
        let program = match &self.settings.use_go_tool {
            Some(tool) => root.join(tool),
            None => root
                .join("bin")
                .join(format!("go{}", std::env::consts::EXE_SUFFIX)),
        };
        if !program.is_file() {
            return Err(Error::ExecutableNotFound { path: program });
        }

        let sources = self.settings.sources.clone();
        if !sources.is_dir() {
            return Err(golane_core::Error::io(
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "source workspace folder does not exist",
                ),
                Some(sources),
                "check sources folder",
            )
            .into());
        }

        let mut args = Vec::with_capacity(
            1 + command.flags.len()
                + self.settings.build_flags.len()
                + tail_args.len()
                + command.extra_tail_args.len(),
        );
        args.push(command.name.clone());
        args.extend(command.flags.iter().cloned());
        args.extend(self.settings.build_flags.iter().cloned());
        args.extend(tail_args.iter().cloned());
        args.extend(command.extra_tail_args.iter().cloned());

        let env = compose_environment(&self.settings, root)?;

        log_optionally(
            self.settings.verbose,
            &format!("command line: {} {}", program.display(), args.join(" ")),
        );

        Ok(ExecutionRequest {
            program,
            args,
            current_dir: sources,
            env,
        })
    }

    fn log_output(&self, command: &GoCommand, result: &ExecutionResult) {
        if (command.enforce_output || self.settings.verbose) && !result.stdout.is_empty() {
            info!("{}", String::from_utf8_lossy(&result.stdout));
        }
        if !result.stderr.is_empty() {
            error!("{}", String::from_utf8_lossy(&result.stderr));
        }
    }
}

/// Launch one run with a fully specified environment and capture both
/// output streams.
async fn launch(request: &ExecutionRequest) -> Result<ExecutionResult> {
    let mut cmd = Command::new(&request.program);
    cmd.args(&request.args)
        .current_dir(&request.current_dir)
        .env_clear()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (name, value) in &request.env {
        cmd.env(name, value);
    }

    let output = cmd.output().await.map_err(|e| {
        golane_core::Error::io(e, Some(request.program.clone()), "launch go tool")
    })?;

    Ok(ExecutionResult {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: output.stdout,
        stderr: output.stderr,
    })
}
