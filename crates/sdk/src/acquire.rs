//! SDK archive download and cache population.

use crate::{ALLOWED_EXTENSIONS, Error, FOLDER_IN_ARCHIVE, Result, archive, catalog};
use golane_core::{Settings, log_optionally};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Content types accepted for a downloaded SDK archive.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/octet-stream",
    "application/zip",
    "application/x-tar",
];

/// Downloads an SDK archive and unpacks it into the store.
///
/// The acquirer owns the archive file and the cache entry for the
/// duration of one acquisition: a failed unpack purges the partial
/// cache entry (policy-controlled), and the archive itself is deleted
/// afterward unless explicitly kept on a clean run. Archives never
/// survive an error, even with the keep flag set.
pub struct SdkAcquirer<'a> {
    client: &'a reqwest::Client,
    settings: &'a Settings,
}

/// Where the archive lives locally and where it comes from.
#[derive(Debug, PartialEq, Eq)]
struct ArchivePlan {
    archive_path: PathBuf,
    url: String,
}

impl<'a> SdkAcquirer<'a> {
    /// Create an acquirer borrowing the shared HTTP client and settings.
    #[must_use]
    pub fn new(client: &'a reqwest::Client, settings: &'a Settings) -> Self {
        Self { client, settings }
    }

    /// Ensure `<store>/<base_name>/` holds an unpacked SDK, downloading
    /// the archive when needed, and return that directory.
    pub async fn acquire(&self, store: &Path, base_name: &str) -> Result<PathBuf> {
        let plan = self.plan(store, base_name).await?;
        let sdk_folder = store.join(base_name);

        let outcome = self.load_and_unpack(&plan, &sdk_folder).await;
        let errored = outcome.is_err();

        if errored || !self.settings.keep_sdk_archive {
            log_optionally(
                self.settings.verbose,
                &format!(
                    "deleting archive {}{}",
                    plan.archive_path.display(),
                    if errored { " (error during loading)" } else { "" }
                ),
            );
            match remove_archive(&plan.archive_path) {
                Ok(()) => {}
                // The triggering error propagates; cleanup stays best-effort.
                Err(e) if errored => warn!(error = %e, "could not delete archive after failure"),
                Err(e) => return Err(e),
            }
        } else {
            log_optionally(
                self.settings.verbose,
                &format!("archive kept by request: {}", plan.archive_path.display()),
            );
        }

        outcome.map(|()| sdk_folder)
    }

    /// Decide the local archive path and download URL.
    async fn plan(&self, store: &Path, base_name: &str) -> Result<ArchivePlan> {
        if let Some(url) = self.settings.sdk_download_url.as_deref()
            && !url.is_empty()
        {
            let plan = plan_for_url(store, base_name, url);
            log_optionally(
                self.settings.verbose,
                &format!("using predefined SDK download URL: {url}"),
            );
            return Ok(plan);
        }
        let file_name = self.find_archive_file_name(base_name).await?;
        Ok(ArchivePlan {
            archive_path: store.join(&file_name),
            url: format!("{}{}", self.settings.sdk_site, file_name),
        })
    }

    /// Resolve the exact archive filename, via the catalog unless a
    /// name is predefined.
    async fn find_archive_file_name(&self, base_name: &str) -> Result<String> {
        if let Some(name) = self.settings.sdk_archive_name.as_deref()
            && !name.is_empty()
        {
            info!(%name, "SDK archive name is predefined");
            return Ok(name.to_string());
        }
        let text = catalog::fetch_catalog(self.client, &self.settings.sdk_site).await?;
        let listing = catalog::parse_catalog(&text)?;
        catalog::find_matching_entry(&listing, base_name, ALLOWED_EXTENSIONS)
    }

    async fn load_and_unpack(&self, plan: &ArchivePlan, sdk_folder: &Path) -> Result<()> {
        if plan.archive_path.is_file() {
            info!(archive = %plan.archive_path.display(), "SDK archive found in the cache");
        } else {
            self.download(plan).await?;
        }

        info!(
            archive = %plan.archive_path.display(),
            dest = %sdk_folder.display(),
            "unpacking SDK archive"
        );
        let unpacked = match archive::unpack_folder(&plan.archive_path, FOLDER_IN_ARCHIVE, sdk_folder)
        {
            Ok(0) => Err(Error::unpack(format!(
                "couldn't find folder '{FOLDER_IN_ARCHIVE}' in archive or the archive is empty"
            ))),
            Ok(count) => {
                info!(files = count, "SDK archive unpacked");
                Ok(())
            }
            Err(e) => Err(e),
        };

        if let Err(e) = unpacked {
            if !self.settings.keep_unpacked_folder_on_error {
                log_optionally(
                    self.settings.verbose,
                    &format!(
                        "deleting folder after unpack failure: {}",
                        sdk_folder.display()
                    ),
                );
                // Best effort; the unpack error is what propagates.
                let _ = std::fs::remove_dir_all(sdk_folder);
            }
            return Err(e);
        }
        Ok(())
    }

    async fn download(&self, plan: &ArchivePlan) -> Result<()> {
        warn!(url = %plan.url, "downloading SDK archive");
        let mut response = self.client.get(&plan.url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::network(&plan.url, status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(Error::content_type(content_type));
        }

        let mut file = tokio::fs::File::create(&plan.archive_path).await.map_err(|e| {
            golane_core::Error::io(e, Some(plan.archive_path.clone()), "create archive file")
        })?;
        let mut total: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            total += chunk.len() as u64;
            file.write_all(&chunk).await.map_err(|e| {
                golane_core::Error::io(e, Some(plan.archive_path.clone()), "write archive")
            })?;
        }
        file.flush().await.map_err(|e| {
            golane_core::Error::io(e, Some(plan.archive_path.clone()), "flush archive")
        })?;

        info!(size_kb = total / 1024, "SDK archive downloaded");
        Ok(())
    }
}

fn plan_for_url(store: &Path, base_name: &str, url: &str) -> ArchivePlan {
    let extension = archive::archive_extension(url);
    debug!(%extension, "detected extension of predefined archive");
    ArchivePlan {
        archive_path: store.join(format!("{base_name}.{extension}")),
        url: url.to_string(),
    }
}

fn remove_archive(path: &Path) -> Result<()> {
    if path.is_file() {
        std::fs::remove_file(path).map_err(|e| {
            golane_core::Error::io(e, Some(path.to_path_buf()), "delete archive").into()
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::fs::File;
    use tar::Builder;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sdk_tarball_bytes() -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = Builder::new(encoder);
        for (name, content) in [("go/bin/go", b"binary".as_slice()), ("go/VERSION", b"go1.6")] {
            let mut header = tar::Header::new_gnu();
            header.set_path(name).unwrap();
            header.set_size(content.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append(&header, content).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn write_sdk_tarball(path: &Path) {
        std::fs::write(path, sdk_tarball_bytes()).unwrap();
    }

    fn settings_with_url(url: &str) -> Settings {
        Settings {
            sdk_download_url: Some(url.to_string()),
            ..Settings::default()
        }
    }

    #[test]
    fn predefined_url_derives_local_archive_name() {
        let plan = plan_for_url(Path::new("/store"), "go1.6.linux-amd64", "http://x/custom-build.zip");
        assert_eq!(
            plan.archive_path,
            PathBuf::from("/store/go1.6.linux-amd64.zip")
        );
        assert_eq!(plan.url, "http://x/custom-build.zip");
    }

    #[test]
    fn predefined_url_keeps_compound_tar_gz_extension() {
        let plan = plan_for_url(
            Path::new("/store"),
            "go1.6.linux-amd64",
            "http://mirror/go-custom.tar.gz",
        );
        assert_eq!(
            plan.archive_path,
            PathBuf::from("/store/go1.6.linux-amd64.tar.gz")
        );
    }

    #[tokio::test]
    async fn cached_archive_is_unpacked_without_download() {
        let temp = TempDir::new().unwrap();
        let settings = settings_with_url("http://unreachable.invalid/sdk.tar.gz");
        let client = reqwest::Client::new();
        let acquirer = SdkAcquirer::new(&client, &settings);

        // Archive already present under the name the plan derives.
        write_sdk_tarball(&temp.path().join("go1.6.linux-amd64.tar.gz"));

        let root = acquirer.acquire(temp.path(), "go1.6.linux-amd64").await.unwrap();
        assert_eq!(root, temp.path().join("go1.6.linux-amd64"));
        assert_eq!(std::fs::read(root.join("bin/go")).unwrap(), b"binary");
    }

    #[tokio::test]
    async fn downloaded_archive_is_unpacked_into_the_store() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/sdk.tar.gz"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/octet-stream")
                    .set_body_bytes(sdk_tarball_bytes()),
            )
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let settings = settings_with_url(&format!("{}/sdk.tar.gz", server.uri()));
        let client = reqwest::Client::new();
        let acquirer = SdkAcquirer::new(&client, &settings);

        let root = acquirer
            .acquire(temp.path(), "go1.6.linux-amd64")
            .await
            .unwrap();
        assert_eq!(std::fs::read(root.join("bin/go")).unwrap(), b"binary");
    }

    #[tokio::test]
    async fn disallowed_content_type_leaves_no_archive_behind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/sdk.tar.gz"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"<html>not an archive</html>".as_slice(), "text/html"),
            )
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let settings = settings_with_url(&format!("{}/sdk.tar.gz", server.uri()));
        let client = reqwest::Client::new();
        let acquirer = SdkAcquirer::new(&client, &settings);

        let err = acquirer
            .acquire(temp.path(), "go1.6.linux-amd64")
            .await
            .unwrap_err();
        match err {
            Error::ContentType { content_type } => assert_eq!(content_type, "text/html"),
            other => panic!("expected ContentType, got {other:?}"),
        }
        assert!(!temp.path().join("go1.6.linux-amd64.tar.gz").exists());
    }

    #[tokio::test]
    async fn non_success_status_is_a_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/sdk.tar.gz"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let settings = settings_with_url(&format!("{}/sdk.tar.gz", server.uri()));
        let client = reqwest::Client::new();
        let acquirer = SdkAcquirer::new(&client, &settings);

        let err = acquirer
            .acquire(temp.path(), "go1.6.linux-amd64")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network { status: 404, .. }));
        assert!(!temp.path().join("go1.6.linux-amd64.tar.gz").exists());
    }

    #[tokio::test]
    async fn archive_deleted_after_successful_unpack_by_default() {
        let temp = TempDir::new().unwrap();
        let settings = settings_with_url("http://unreachable.invalid/sdk.tar.gz");
        let client = reqwest::Client::new();
        let acquirer = SdkAcquirer::new(&client, &settings);

        let archive = temp.path().join("go1.6.linux-amd64.tar.gz");
        write_sdk_tarball(&archive);

        acquirer.acquire(temp.path(), "go1.6.linux-amd64").await.unwrap();
        assert!(!archive.exists());
    }

    #[tokio::test]
    async fn keep_flag_preserves_archive_on_success() {
        let temp = TempDir::new().unwrap();
        let mut settings = settings_with_url("http://unreachable.invalid/sdk.tar.gz");
        settings.keep_sdk_archive = true;
        let client = reqwest::Client::new();
        let acquirer = SdkAcquirer::new(&client, &settings);

        let archive = temp.path().join("go1.6.linux-amd64.tar.gz");
        write_sdk_tarball(&archive);

        acquirer.acquire(temp.path(), "go1.6.linux-amd64").await.unwrap();
        assert!(archive.exists());
    }

    #[tokio::test]
    async fn archive_never_survives_an_unpack_error() {
        let temp = TempDir::new().unwrap();
        let mut settings = settings_with_url("http://unreachable.invalid/sdk.tar.gz");
        settings.keep_sdk_archive = true;
        let client = reqwest::Client::new();
        let acquirer = SdkAcquirer::new(&client, &settings);

        let archive = temp.path().join("go1.6.linux-amd64.tar.gz");
        std::fs::write(&archive, b"corrupt").unwrap();

        let err = acquirer
            .acquire(temp.path(), "go1.6.linux-amd64")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unpack { .. }));
        assert!(!archive.exists());
    }

    #[tokio::test]
    async fn unpack_failure_purges_partial_destination() {
        let temp = TempDir::new().unwrap();
        let settings = settings_with_url("http://unreachable.invalid/sdk.tar.gz");
        let client = reqwest::Client::new();
        let acquirer = SdkAcquirer::new(&client, &settings);

        // Tarball without the expected top-level folder extracts nothing.
        let archive = temp.path().join("go1.6.linux-amd64.tar.gz");
        let file = File::create(&archive).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_path("wrong/file").unwrap();
        header.set_size(1);
        header.set_cksum();
        builder.append(&header, b"x".as_slice()).unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let err = acquirer
            .acquire(temp.path(), "go1.6.linux-amd64")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unpack { .. }));
        assert!(!temp.path().join("go1.6.linux-amd64").exists());
    }

    #[tokio::test]
    async fn unpack_failure_keeps_destination_when_flagged() {
        let temp = TempDir::new().unwrap();
        let mut settings = settings_with_url("http://unreachable.invalid/sdk.tar.gz");
        settings.keep_unpacked_folder_on_error = true;
        let client = reqwest::Client::new();
        let acquirer = SdkAcquirer::new(&client, &settings);

        let archive = temp.path().join("go1.6.linux-amd64.tar.gz");
        std::fs::write(&archive, b"corrupt").unwrap();
        // Pre-existing partial output stands in for a half-finished unpack.
        let partial = temp.path().join("go1.6.linux-amd64");
        std::fs::create_dir_all(&partial).unwrap();
        std::fs::write(partial.join("half-done"), b"x").unwrap();

        let err = acquirer
            .acquire(temp.path(), "go1.6.linux-amd64")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unpack { .. }));
        assert!(partial.join("half-done").exists());
    }
}
