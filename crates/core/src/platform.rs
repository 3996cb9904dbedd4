//! Platform resolution and SDK base-name synthesis.
//!
//! Go distributions are published under names like
//! `go1.6.linux-amd64.tar.gz`; this module infers the OS and
//! architecture tokens of that name from explicit settings or from the
//! host, and synthesizes the canonical base name used both as the
//! cache directory and the expected archive stem.

use crate::Settings;
use std::fmt;

/// Default qualifier appended on Apple hosts when none is configured.
const DEFAULT_OSX_QUALIFIER: &str = "osx10.6";

/// Resolved identity of one SDK distribution.
///
/// Immutable once computed for an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainSpec {
    /// SDK version, e.g. "1.6".
    pub version: String,
    /// Lowercase OS token, e.g. "linux".
    pub os: String,
    /// Lowercase architecture token, e.g. "amd64".
    pub arch: String,
    /// Optional OSX sub-version qualifier, e.g. "osx10.6".
    pub osx_qualifier: Option<String>,
}

impl ToolchainSpec {
    /// Resolve the spec from settings, probing the host for anything
    /// the settings leave open.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            version: settings.go_version.clone(),
            os: resolve_os(settings.os.as_deref()),
            arch: resolve_arch(settings.arch.as_deref(), std::env::consts::ARCH),
            osx_qualifier: resolve_osx_qualifier(settings.osx_version.as_deref()),
        }
    }

    /// Canonical base name: `go<version>.<os>-<arch>[-<qualifier>]`.
    ///
    /// Fields are substituted verbatim, without any normalization.
    #[must_use]
    pub fn base_name(&self) -> String {
        let qualifier = self
            .osx_qualifier
            .as_deref()
            .map(|q| format!("-{q}"))
            .unwrap_or_default();
        format!("go{}.{}-{}{}", self.version, self.os, self.arch, qualifier)
    }
}

impl fmt::Display for ToolchainSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_name())
    }
}

/// Resolve the OS token. The explicit value wins; otherwise the host
/// OS family is mapped to one of windows/linux/freebsd/darwin.
///
/// Any unrecognized unix-like host falls back to "darwin". That
/// mirrors how Go distribution names were historically matched and is
/// intentionally not a general OS detector.
#[must_use]
pub fn resolve_os(explicit: Option<&str>) -> String {
    if let Some(os) = explicit
        && !os.is_empty()
    {
        return os.to_string();
    }
    match std::env::consts::OS {
        "windows" => "windows",
        "linux" => "linux",
        "freebsd" => "freebsd",
        _ => "darwin",
    }
    .to_string()
}

/// Resolve the architecture token from an explicit value or a raw
/// architecture string.
///
/// The heuristic is coarse on purpose: anything containing "arm" is
/// "arm", the 32-bit x86 spellings are "386", and everything else is
/// "amd64".
#[must_use]
pub fn resolve_arch(explicit: Option<&str>, raw_arch: &str) -> String {
    if let Some(arch) = explicit
        && !arch.is_empty()
    {
        return arch.to_string();
    }
    let raw = raw_arch.to_lowercase();
    if raw.contains("arm") {
        "arm".to_string()
    } else if raw == "386" || raw == "i386" || raw == "x86" {
        "386".to_string()
    } else {
        "amd64".to_string()
    }
}

/// Resolve the OSX qualifier. The explicit value wins; otherwise a
/// fixed default applies only on Apple hosts.
#[must_use]
pub fn resolve_osx_qualifier(explicit: Option<&str>) -> Option<String> {
    match explicit {
        Some(q) if !q.is_empty() => Some(q.to_string()),
        _ if cfg!(target_os = "macos") => Some(DEFAULT_OSX_QUALIFIER.to_string()),
        _ => None,
    }
}

/// Warn when a synthesized base name carries uppercase characters.
///
/// Distribution names are lowercase by convention; this is advisory
/// only and never rejects the name.
pub fn warn_if_uppercase(base_name: &str) {
    if base_name.chars().any(|c| c.is_uppercase()) {
        tracing::warn!(%base_name, "prefer lowercase characters for the SDK base name");
    }
}
