//! Archive extraction for downloaded project sources.
//!
//! Extracts tar (plain, gzip, zstd) and zip archives to a target directory
//! with path traversal protection to prevent zip-slip attacks.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path};

use super::format::ArchiveFormat;

/// Trait for extracting archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use opensource_fetch::archive::extraction::FormatExtractor;
///
/// let extractor = FormatExtractor;
/// // Use extractor.extract(archive_path, dest_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// Returns the archive-relative paths of the extracted entries.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::UnsupportedFormat`] if the format cannot be
    /// determined from the file name.
    /// Returns [`ExtractionError::PathTraversal`] if any entry attempts to
    /// escape the destination directory.
    /// Returns [`ExtractionError::Io`] or [`ExtractionError::Zip`] on read
    /// and write failures.
    fn extract(&self, archive_path: &Path, dest_dir: &Path)
    -> Result<Vec<String>, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip container could not be read.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive's format is not recognised.
    #[error("unsupported archive format: {path}")]
    UnsupportedFormat {
        /// The archive whose format could not be determined.
        path: String,
    },
}

/// Default extractor that dispatches on the archive's file name.
///
/// Validates each entry path before extraction to guard against path
/// traversal attacks (zip-slip).
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatExtractor;

impl ArchiveExtractor for FormatExtractor {
    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
    ) -> Result<Vec<String>, ExtractionError> {
        let format = ArchiveFormat::from_path(archive_path).ok_or_else(|| {
            ExtractionError::UnsupportedFormat {
                path: archive_path.display().to_string(),
            }
        })?;
        log::debug!("extracting {} as {format}", archive_path.display());

        let file = BufReader::new(File::open(archive_path)?);
        let extracted = match format {
            ArchiveFormat::Tar => extract_tar(file, dest_dir)?,
            ArchiveFormat::TarGz => extract_tar(flate2::read::GzDecoder::new(file), dest_dir)?,
            ArchiveFormat::TarZst => extract_tar(zstd::Decoder::with_buffer(file)?, dest_dir)?,
            ArchiveFormat::Zip => extract_zip(file, dest_dir)?,
        };

        log::debug!(
            "extracted {} entries into {}",
            extracted.len(),
            dest_dir.display()
        );
        Ok(extracted)
    }
}

/// Unpack every entry of a tar stream into `dest_dir`.
fn extract_tar<R: Read>(reader: R, dest_dir: &Path) -> Result<Vec<String>, ExtractionError> {
    let mut archive = tar::Archive::new(reader);
    let mut extracted = Vec::new();

    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let entry_path = entry.path()?.into_owned();

        validate_entry_path(&entry_path)?;

        // `unpack_in` re-checks containment, including through symlinks
        // created by earlier entries.
        if !entry.unpack_in(dest_dir)? {
            return Err(ExtractionError::PathTraversal {
                path: entry_path.display().to_string(),
            });
        }

        extracted.push(entry_path.display().to_string());
    }

    Ok(extracted)
}

/// Unpack every entry of a zip container into `dest_dir`.
fn extract_zip<R: Read + std::io::Seek>(
    reader: R,
    dest_dir: &Path,
) -> Result<Vec<String>, ExtractionError> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let mut extracted = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(entry_path) = entry.enclosed_name() else {
            return Err(ExtractionError::PathTraversal {
                path: entry.name().to_owned(),
            });
        };
        validate_entry_path(&entry_path)?;

        let dest_path = dest_dir.join(&entry_path);
        if entry.is_dir() {
            std::fs::create_dir_all(&dest_path)?;
        } else {
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut outfile = File::create(&dest_path)?;
            std::io::copy(&mut entry, &mut outfile)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    std::fs::set_permissions(&dest_path, std::fs::Permissions::from_mode(mode))?;
                }
            }
        }

        extracted.push(entry_path.display().to_string());
    }

    Ok(extracted)
}

/// Validate that an entry path does not escape the destination directory
/// via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    let escapes = path.is_absolute()
        || path.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ArchiveEntry, write_archive};
    use rstest::rstest;
    use std::path::PathBuf;

    fn entries() -> Vec<ArchiveEntry> {
        vec![
            ArchiveEntry::file("dyld-1/README", b"hello world"),
            ArchiveEntry::file("dyld-1/src/main.c", b"int main(void) { return 0; }"),
        ]
    }

    #[rstest]
    #[case::tar("dyld-1.tar")]
    #[case::tar_gz("dyld-1.tar.gz")]
    #[case::tgz("dyld-1.tgz")]
    #[case::tar_zst("dyld-1.tar.zst")]
    #[case::zip("dyld-1.zip")]
    fn extracts_supported_formats(#[case] name: &str) {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join(name);
        write_archive(&archive_path, &entries()).expect("write archive");
        let dest_dir = temp_dir.path().join("out");
        std::fs::create_dir_all(&dest_dir).expect("create dest");

        let files = FormatExtractor
            .extract(&archive_path, &dest_dir)
            .expect("extract");

        assert_eq!(files, vec!["dyld-1/README", "dyld-1/src/main.c"]);
        let readme = std::fs::read(dest_dir.join("dyld-1/README")).expect("read README");
        assert_eq!(readme, b"hello world");
        assert!(dest_dir.join("dyld-1/src/main.c").exists());
    }

    #[test]
    fn leaves_the_archive_in_place() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("dyld-1.tar.gz");
        write_archive(&archive_path, &entries()).expect("write archive");

        FormatExtractor
            .extract(&archive_path, temp_dir.path())
            .expect("extract");

        assert!(archive_path.exists());
    }

    #[test]
    fn rejects_unknown_format() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("dyld-1.rar");
        std::fs::write(&archive_path, b"not an archive").expect("write");

        let result = FormatExtractor.extract(&archive_path, temp_dir.path());
        assert!(matches!(
            result,
            Err(ExtractionError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn corrupt_gzip_reports_io_error() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("broken.tar.gz");
        std::fs::write(&archive_path, b"definitely not gzip").expect("write");

        let result = FormatExtractor.extract(&archive_path, temp_dir.path());
        assert!(matches!(result, Err(ExtractionError::Io(_))), "got {result:?}");
    }

    #[test]
    fn tar_entry_escaping_destination_is_rejected() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("evil.tar");
        let dest_dir = temp_dir.path().join("out");
        std::fs::create_dir_all(&dest_dir).expect("create dest");

        // tar::Builder refuses `..` in paths, so write the header name raw.
        let data: &[u8] = b"escaped";
        let mut header = tar::Header::new_old();
        let name = b"../escape.txt";
        header.as_old_mut().name[..name.len()].copy_from_slice(name);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        let mut builder = tar::Builder::new(File::create(&archive_path).expect("create"));
        builder.append(&header, data).expect("append");
        builder.finish().expect("finish");

        let result = FormatExtractor.extract(&archive_path, &dest_dir);

        assert!(matches!(
            result,
            Err(ExtractionError::PathTraversal { .. })
        ));
        assert!(!temp_dir.path().join("escape.txt").exists());
    }

    #[rstest]
    #[case::parent_dir("../escape.txt")]
    #[case::nested_parent("foo/../../escape.txt")]
    #[case::absolute("/etc/passwd")]
    fn rejects_path_traversal(#[case] bad_path: &str) {
        let path = PathBuf::from(bad_path);
        let result = validate_entry_path(&path);
        assert!(
            matches!(result, Err(ExtractionError::PathTraversal { .. })),
            "expected PathTraversal for {bad_path}"
        );
    }

    #[test]
    fn accepts_normal_paths() {
        let path = PathBuf::from("dyld-1/src/main.c");
        assert!(validate_entry_path(&path).is_ok());
    }
}
