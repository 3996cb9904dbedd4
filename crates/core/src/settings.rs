//! Configuration surface for golane.
//!
//! The host build system fills a [`Settings`] value (directly or by
//! deserializing its own config format) and hands it to the locator
//! and supervisor. Every "explicit value vs. environment variable"
//! decision goes through [`resolve_with_env`] / [`resolve_path_with_env`]
//! so the precedence rule lives in exactly one place: an explicit
//! setting always wins, the environment is consulted only when the
//! setting is absent and `use_env_vars` is enabled.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default remote site listing and hosting Go SDK archives.
pub const DEFAULT_SDK_SITE: &str = "https://storage.googleapis.com/golang/";

/// Default Go SDK version provisioned when none is configured.
pub const DEFAULT_GO_VERSION: &str = "1.6";

/// All knobs controlling SDK acquisition and process execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Remote site for the SDK catalog and archive downloads.
    pub sdk_site: String,
    /// Folder where downloaded SDKs are unpacked and cached.
    pub store_folder: PathBuf,
    /// GOPATH workspace folder. Defaults to `.go_path` under the store.
    pub go_path: Option<PathBuf>,
    /// Go SDK version, used when `go_root` is undefined.
    pub go_version: String,
    /// Predefined toolchain root. Set it to bypass acquisition entirely.
    pub go_root: Option<PathBuf>,
    /// Bootstrap toolchain root, exported as GOROOT_BOOTSTRAP.
    pub go_root_bootstrap: Option<PathBuf>,
    /// Fail instead of downloading when the SDK is not cached.
    pub disable_sdk_load: bool,
    /// Folder holding the Go sources to build.
    pub sources: PathBuf,
    /// OS token for base-name synthesis; probed from the host if empty.
    pub os: Option<String>,
    /// Architecture token for base-name synthesis; probed if empty.
    pub arch: Option<String>,
    /// OSX qualifier appended to the base name on Apple hosts.
    pub osx_version: Option<String>,
    /// Cross-compilation target OS, exported as GOOS.
    pub target_os: Option<String>,
    /// Cross-compilation target architecture, exported as GOARCH.
    pub target_arch: Option<String>,
    /// Extra flags passed to every go invocation.
    pub build_flags: Vec<String>,
    /// Log command lines and progress at info level.
    pub verbose: bool,
    /// Do not delete the SDK archive after unpacking.
    pub keep_sdk_archive: bool,
    /// Keep the partially unpacked folder when unpacking fails.
    pub keep_unpacked_folder_on_error: bool,
    /// Relative path of a tool to run instead of `bin/go`.
    pub use_go_tool: Option<String>,
    /// Allow GOROOT, GOPATH, GOOS, GOARCH and GOROOT_BOOTSTRAP
    /// environment variables to supply missing settings.
    pub use_env_vars: bool,
    /// Extra environment variables for the subprocess, applied last.
    pub env: Vec<(String, String)>,
    /// Exact archive filename, bypassing the catalog lookup.
    pub sdk_archive_name: Option<String>,
    /// Direct download URL, bypassing the catalog entirely.
    pub sdk_download_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            sdk_site: DEFAULT_SDK_SITE.to_string(),
            store_folder: home.join(".golane"),
            go_path: None,
            go_version: DEFAULT_GO_VERSION.to_string(),
            go_root: None,
            go_root_bootstrap: None,
            disable_sdk_load: false,
            sources: PathBuf::from("src").join("golang"),
            os: None,
            arch: None,
            osx_version: None,
            target_os: None,
            target_arch: None,
            build_flags: Vec::new(),
            verbose: false,
            keep_sdk_archive: false,
            keep_unpacked_folder_on_error: false,
            use_go_tool: None,
            use_env_vars: false,
            env: Vec::new(),
            sdk_archive_name: None,
            sdk_download_url: None,
        }
    }
}

impl Settings {
    /// Resolved toolchain root override, if any.
    #[must_use]
    pub fn go_root(&self) -> Option<PathBuf> {
        resolve_path_with_env(self.go_root.as_deref(), "GOROOT", self.use_env_vars)
    }

    /// Resolved GOPATH workspace folder.
    #[must_use]
    pub fn go_path(&self) -> PathBuf {
        resolve_path_with_env(self.go_path.as_deref(), "GOPATH", self.use_env_vars)
            .unwrap_or_else(|| self.store_folder.join(".go_path"))
    }

    /// Resolved bootstrap toolchain root, if any.
    #[must_use]
    pub fn go_root_bootstrap(&self) -> Option<PathBuf> {
        resolve_path_with_env(
            self.go_root_bootstrap.as_deref(),
            "GOROOT_BOOTSTRAP",
            self.use_env_vars,
        )
    }

    /// Resolved target OS override, if any.
    #[must_use]
    pub fn target_os(&self) -> Option<String> {
        resolve_with_env(self.target_os.as_deref(), "GOOS", self.use_env_vars)
    }

    /// Resolved target architecture override, if any.
    #[must_use]
    pub fn target_arch(&self) -> Option<String> {
        resolve_with_env(self.target_arch.as_deref(), "GOARCH", self.use_env_vars)
    }
}

/// Resolve a string setting against an environment variable.
///
/// The explicit value wins when present and non-empty; the variable is
/// consulted only when `use_env_vars` is enabled; otherwise the value
/// is absent.
#[must_use]
pub fn resolve_with_env(explicit: Option<&str>, var: &str, use_env_vars: bool) -> Option<String> {
    match explicit {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ if use_env_vars => std::env::var(var).ok().filter(|v| !v.is_empty()),
        _ => None,
    }
}

/// Path-valued twin of [`resolve_with_env`].
#[must_use]
pub fn resolve_path_with_env(
    explicit: Option<&Path>,
    var: &str,
    use_env_vars: bool,
) -> Option<PathBuf> {
    match explicit {
        Some(path) if !path.as_os_str().is_empty() => Some(path.to_path_buf()),
        _ if use_env_vars => std::env::var_os(var)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from),
        _ => None,
    }
}
