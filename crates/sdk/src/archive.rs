//! Archive unpacking for SDK distributions.
//!
//! Go SDK archives carry the whole distribution under a single
//! top-level `go/` folder. Only that folder is extracted, with the
//! prefix stripped, so the cache entry directly becomes the toolchain
//! root. Both `.tar.gz` and `.zip` archives are handled, dispatched on
//! the file extension.

use crate::{Error, Result};
use flate2::read::GzDecoder;
use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};
use tracing::trace;

/// Derive the archive extension from a filename or URL.
///
/// A name ending in the compound extension `tar.gz` keeps that whole
/// suffix; otherwise the final dot-extension is taken. Returns an
/// empty string when the name has no extension at all.
#[must_use]
pub fn archive_extension(name: &str) -> String {
    if name.ends_with(".tar.gz") {
        return "tar.gz".to_string();
    }
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_string(),
        None => String::new(),
    }
}

/// Unpack the named top-level folder out of `archive` into `dest`,
/// stripping the folder prefix. Returns the number of extracted files.
///
/// Entries outside the folder are skipped silently; a count of zero
/// means the folder was absent or the archive was empty, which the
/// caller treats as a failed unpack.
pub fn unpack_folder(archive: &Path, folder: &str, dest: &Path) -> Result<usize> {
    let name = archive.to_string_lossy();
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        unpack_tar_gz(archive, folder, dest)
    } else if name.ends_with(".zip") {
        unpack_zip(archive, folder, dest)
    } else {
        Err(Error::unpack(format!(
            "unsupported archive format: {name}"
        )))
    }
}

fn unpack_tar_gz(archive: &Path, folder: &str, dest: &Path) -> Result<usize> {
    let file = File::open(archive)
        .map_err(|e| golane_core::Error::io(e, Some(archive.to_path_buf()), "open archive"))?;
    let mut tar = Archive::new(GzDecoder::new(file));

    let mut count = 0;
    for entry in tar.entries().map_err(|e| Error::unpack(e.to_string()))? {
        let mut entry = entry.map_err(|e| Error::unpack(e.to_string()))?;
        let entry_path = entry
            .path()
            .map_err(|e| Error::unpack(e.to_string()))?
            .into_owned();
        let Some(relative) = strip_archive_folder(&entry_path, folder) else {
            continue;
        };
        let out_path = dest.join(&relative);
        trace!(entry = %entry_path.display(), "extracting tar entry");

        if entry.header().entry_type() == EntryType::Directory {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(|e| Error::unpack(e.to_string()))?;
        std::fs::write(&out_path, &content)?;

        #[cfg(unix)]
        if let Ok(mode) = entry.header().mode() {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&out_path)?.permissions();
            perms.set_mode(mode);
            std::fs::set_permissions(&out_path, perms)?;
        }

        count += 1;
    }
    Ok(count)
}

fn unpack_zip(archive: &Path, folder: &str, dest: &Path) -> Result<usize> {
    let file = File::open(archive)
        .map_err(|e| golane_core::Error::io(e, Some(archive.to_path_buf()), "open archive"))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| Error::unpack(e.to_string()))?;

    let mut count = 0;
    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| Error::unpack(e.to_string()))?;
        let Some(entry_path) = entry.enclosed_name() else {
            continue;
        };
        let Some(relative) = strip_archive_folder(&entry_path, folder) else {
            continue;
        };
        let out_path = dest.join(&relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(|e| Error::unpack(e.to_string()))?;
        std::fs::write(&out_path, &content)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&out_path)?.permissions();
            perms.set_mode(mode);
            std::fs::set_permissions(&out_path, perms)?;
        }

        count += 1;
    }
    Ok(count)
}

/// Strip the leading archive folder from an entry path.
///
/// Returns `None` when the entry does not live under the folder.
fn strip_archive_folder(path: &Path, folder: &str) -> Option<PathBuf> {
    let mut components = path.components().filter_map(|c| match c {
        Component::Normal(part) => Some(part),
        _ => None,
    });
    let first = components.next()?;
    if first != OsStr::new(folder) {
        return None;
    }
    Some(components.collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tar::Builder;
    use tempfile::TempDir;

    fn create_test_tarball(dir: &Path, files: &[(&str, &[u8])]) -> PathBuf {
        let tarball_path = dir.join("sdk.tar.gz");
        let file = File::create(&tarball_path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = Builder::new(encoder);

        for (path, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_path(path).unwrap();
            header.set_size(content.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append(&header, &content[..]).unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap();
        tarball_path
    }

    fn create_test_zip(dir: &Path, files: &[(&str, &[u8])]) -> PathBuf {
        let zip_path = dir.join("sdk.zip");
        let file = File::create(&zip_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);

        for (path, content) in files {
            writer.start_file(*path, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
        zip_path
    }

    #[test]
    fn extension_handles_compound_tar_gz() {
        assert_eq!(archive_extension("go1.6.linux-amd64.tar.gz"), "tar.gz");
        assert_eq!(
            archive_extension("http://example.com/go1.6.linux-amd64.tar.gz"),
            "tar.gz"
        );
    }

    #[test]
    fn extension_takes_final_dot_suffix() {
        assert_eq!(archive_extension("go1.6.windows-amd64.zip"), "zip");
        assert_eq!(archive_extension("http://x/custom-build.zip"), "zip");
    }

    #[test]
    fn extension_is_empty_without_a_dot() {
        assert_eq!(archive_extension("http://example.com/download"), "");
    }

    #[test]
    fn unpacks_only_the_named_folder_from_tarball() {
        let temp = TempDir::new().unwrap();
        let tarball = create_test_tarball(
            temp.path(),
            &[
                ("go/bin/go", b"binary".as_slice()),
                ("go/VERSION", b"go1.6".as_slice()),
                ("other/readme", b"skip me".as_slice()),
            ],
        );

        let dest = temp.path().join("go1.6.linux-amd64");
        let count = unpack_folder(&tarball, "go", &dest).unwrap();

        assert_eq!(count, 2);
        assert_eq!(std::fs::read(dest.join("bin/go")).unwrap(), b"binary");
        assert_eq!(std::fs::read(dest.join("VERSION")).unwrap(), b"go1.6");
        assert!(!dest.join("other").exists());
        assert!(!dest.join("readme").exists());
    }

    #[test]
    fn unpacks_zip_archives() {
        let temp = TempDir::new().unwrap();
        let zip = create_test_zip(
            temp.path(),
            &[
                ("go/bin/go.exe", b"binary".as_slice()),
                ("go/VERSION", b"go1.6".as_slice()),
            ],
        );

        let dest = temp.path().join("go1.6.windows-amd64");
        let count = unpack_folder(&zip, "go", &dest).unwrap();

        assert_eq!(count, 2);
        assert_eq!(std::fs::read(dest.join("bin/go.exe")).unwrap(), b"binary");
    }

    #[test]
    fn missing_folder_extracts_nothing() {
        let temp = TempDir::new().unwrap();
        let tarball = create_test_tarball(temp.path(), &[("elsewhere/file", b"x".as_slice())]);

        let dest = temp.path().join("out");
        let count = unpack_folder(&tarball, "go", &dest).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn unsupported_format_is_an_unpack_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sdk.rar");
        std::fs::write(&path, b"not an archive").unwrap();

        let err = unpack_folder(&path, "go", &temp.path().join("out")).unwrap_err();
        assert!(matches!(err, Error::Unpack { .. }));
    }

    #[test]
    fn corrupt_tarball_is_an_unpack_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sdk.tar.gz");
        std::fs::write(&path, b"definitely not gzip").unwrap();

        let err = unpack_folder(&path, "go", &temp.path().join("out")).unwrap_err();
        assert!(matches!(err, Error::Unpack { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn preserves_unix_modes() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let tarball = create_test_tarball(temp.path(), &[("go/bin/go", b"binary".as_slice())]);

        let dest = temp.path().join("out");
        unpack_folder(&tarball, "go", &dest).unwrap();

        let mode = std::fs::metadata(dest.join("bin/go"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
