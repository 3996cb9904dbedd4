//! Toolchain root resolution.

use crate::{Result, SdkAcquirer};
use golane_core::platform::{ToolchainSpec, warn_if_uppercase};
use golane_core::{Settings, log_optionally};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Resolves the toolchain root for one settings instance.
///
/// Resolution is serialized through the locator's own mutex: build
/// steps sharing a locator never race on writing the same cache
/// directory or archive file. The lock is held across acquisition,
/// including network I/O. There is no cross-process lock; two
/// processes sharing a store folder can still race.
pub struct ToolchainLocator {
    settings: Arc<Settings>,
    client: reqwest::Client,
    lock: Mutex<()>,
}

impl ToolchainLocator {
    /// Create a locator for the given settings.
    ///
    /// # Panics
    ///
    /// `reqwest::Client::builder().build()` only fails on broken TLS
    /// backend initialization, which with default settings indicates a
    /// fundamental environment issue.
    #[must_use]
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            client: reqwest::Client::builder()
                .user_agent("golane")
                .build()
                .expect("Failed to create HTTP client - TLS backend initialization failed"),
            lock: Mutex::new(()),
        }
    }

    /// The settings this locator resolves against.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolve the toolchain root directory.
    ///
    /// A configured root override is validated and returned as-is,
    /// bypassing all acquisition. Otherwise the canonical base name is
    /// synthesized and the store is consulted; only on a cache miss is
    /// the SDK downloaded. Cache identity is directory existence, so
    /// repeated calls are cheap.
    pub async fn locate(&self) -> Result<PathBuf> {
        let _guard = self.lock.lock().await;

        if let Some(root) = self.settings.go_root() {
            log_optionally(
                self.settings.verbose,
                &format!("predefined SDK root folder: {}", root.display()),
            );
            if !root.is_dir() {
                return Err(golane_core::Error::configuration(format!(
                    "predefined SDK root is not a directory: {}",
                    root.display()
                ))
                .into());
            }
            return Ok(root);
        }

        let store = &self.settings.store_folder;
        if !store.is_dir() {
            log_optionally(
                self.settings.verbose,
                &format!("creating SDK store folder: {}", store.display()),
            );
            std::fs::create_dir_all(store).map_err(|e| {
                golane_core::Error::io(e, Some(store.clone()), "create store folder")
            })?;
        }

        let spec = ToolchainSpec::from_settings(&self.settings);
        let base_name = spec.base_name();
        warn_if_uppercase(&base_name);
        debug!(%base_name, "synthesized SDK base name");

        let cached = store.join(&base_name);
        if cached.is_dir() {
            log_optionally(
                self.settings.verbose,
                &format!("cached SDK detected: {}", cached.display()),
            );
            return Ok(cached);
        }

        if self.settings.disable_sdk_load {
            return Err(golane_core::Error::configuration(format!(
                "can't find {base_name} in the cache and SDK downloading is disabled"
            ))
            .into());
        }

        SdkAcquirer::new(&self.client, &self.settings)
            .acquire(store, &base_name)
            .await
    }
}
