//! Environment composition for go subprocesses.

use crate::Result;
use golane_core::{Settings, log_optionally};
use std::path::{Path, PathBuf};

/// Fully assembled subprocess invocation.
///
/// The environment is an ordered list applied over a cleared process
/// environment, so later pairs shadow earlier ones and nothing leaks
/// in from the host wholesale.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Absolute path of the tool to launch.
    pub program: PathBuf,
    /// Full argument list, command name first.
    pub args: Vec<String>,
    /// Working directory, the Go source workspace.
    pub current_dir: PathBuf,
    /// Environment pairs in application order.
    pub env: Vec<(String, String)>,
}

/// Compose the environment variable set for a go invocation.
///
/// GOROOT and GOPATH are always present; the GOPATH workspace folder
/// is created if missing. GOOS, GOARCH and GOROOT_BOOTSTRAP are added
/// only when their settings resolve to a value, and the bootstrap root
/// must be an existing directory. User-supplied pairs land last so
/// they shadow anything composed before them.
pub fn compose_environment(settings: &Settings, toolchain_root: &Path) -> Result<Vec<(String, String)>> {
    let mut env = Vec::new();

    add_env(&mut env, settings, "GOROOT", toolchain_root.to_string_lossy());

    let go_path = settings.go_path();
    if !go_path.is_dir() {
        std::fs::create_dir_all(&go_path).map_err(|e| {
            golane_core::Error::io(e, Some(go_path.clone()), "create GOPATH folder")
        })?;
    }
    add_env(&mut env, settings, "GOPATH", go_path.to_string_lossy());

    if let Some(target_os) = settings.target_os() {
        add_env(&mut env, settings, "GOOS", target_os);
    }
    if let Some(target_arch) = settings.target_arch() {
        add_env(&mut env, settings, "GOARCH", target_arch);
    }

    if let Some(bootstrap) = settings.go_root_bootstrap() {
        if !bootstrap.is_dir() {
            return Err(golane_core::Error::io(
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "bootstrap toolchain root is not a directory",
                ),
                Some(bootstrap),
                "check GOROOT_BOOTSTRAP",
            )
            .into());
        }
        add_env(&mut env, settings, "GOROOT_BOOTSTRAP", bootstrap.to_string_lossy());
    }

    for (name, value) in &settings.env {
        add_env(&mut env, settings, name, value.as_str());
    }

    Ok(env)
}

fn add_env(
    env: &mut Vec<(String, String)>,
    settings: &Settings,
    name: impl Into<String>,
    value: impl Into<String>,
) {
    let name = name.into();
    let value = value.into();
    log_optionally(settings.verbose, &format!("process env var {name}={value}"));
    env.push((name, value));
}
