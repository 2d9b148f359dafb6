//! Output directory preparation and archive placement.
//!
//! Archives are downloaded into a scratch file inside the output directory
//! and then renamed into place, so a failed transfer never leaves a partial
//! archive under its final name.

use crate::error::{FetchError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::NamedTempFile;

/// What to do when an archive already exists at its destination.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OverwritePolicy {
    /// Fail with [`FetchError::FileMove`].
    #[default]
    Refuse,
    /// Replace the existing file.
    Replace,
}

/// Places downloaded archives into the output directory.
#[derive(Clone, Debug)]
pub struct Stager {
    output_dir: Utf8PathBuf,
    policy: OverwritePolicy,
}

impl Stager {
    /// Create a stager for `output_dir`.
    #[must_use]
    pub fn new(output_dir: Utf8PathBuf, policy: OverwritePolicy) -> Self {
        Self { output_dir, policy }
    }

    /// Return the output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    /// Ensure the output directory exists, creating parents as needed.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::DirectoryCreation`] if the directory cannot be
    /// created.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|source| FetchError::DirectoryCreation {
            path: self.output_dir.clone(),
            source,
        })
    }

    /// Return the destination path for an archive named `filename`.
    #[must_use]
    pub fn destination(&self, filename: &str) -> Utf8PathBuf {
        self.output_dir.join(filename)
    }

    /// Check that `dest` may be written under the overwrite policy.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::FileMove`] with [`std::io::ErrorKind::AlreadyExists`]
    /// when the policy refuses and `dest` already exists.
    pub fn ensure_available(&self, dest: &Utf8Path) -> Result<()> {
        if self.policy == OverwritePolicy::Refuse && dest.exists() {
            return Err(FetchError::FileMove {
                path: dest.to_owned(),
                source: already_exists(),
            });
        }
        Ok(())
    }

    /// Create a scratch file in the output directory to download into.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn scratch_file(&self) -> std::io::Result<NamedTempFile> {
        tempfile::Builder::new()
            .prefix(".opensource-fetch-")
            .suffix(".part")
            .tempfile_in(&self.output_dir)
    }

    /// Move a completed scratch file to `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::FileMove`] if the rename fails, including when
    /// the policy refuses and `dest` appeared after the availability check.
    pub fn place(&self, scratch: NamedTempFile, dest: &Utf8Path) -> Result<()> {
        let persisted = match self.policy {
            OverwritePolicy::Refuse => scratch.persist_noclobber(dest),
            OverwritePolicy::Replace => scratch.persist(dest),
        };
        persisted.map_err(|e| FetchError::FileMove {
            path: dest.to_owned(),
            source: e.error,
        })?;
        log::debug!("placed archive at {dest}");
        Ok(())
    }
}

fn already_exists() -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        "destination exists; pass --force to overwrite",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::io::Write;
    use tempfile::TempDir;

    #[fixture]
    fn out() -> (TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
        (temp, path)
    }

    fn scratch_with(stager: &Stager, contents: &[u8]) -> NamedTempFile {
        let mut scratch = stager.scratch_file().expect("scratch file");
        scratch.write_all(contents).expect("write scratch");
        scratch
    }

    #[rstest]
    fn prepare_creates_nested_directories(out: (TempDir, Utf8PathBuf)) {
        let (_temp, root) = out;
        let nested = root.join("a").join("b");
        let stager = Stager::new(nested.clone(), OverwritePolicy::Refuse);

        stager.prepare().expect("prepare");

        assert!(nested.is_dir());
    }

    #[rstest]
    fn prepare_reports_directory_creation_failure(out: (TempDir, Utf8PathBuf)) {
        let (_temp, root) = out;
        let blocker = root.join("file");
        fs::write(&blocker, b"x").expect("write blocker");
        let stager = Stager::new(blocker.join("sub"), OverwritePolicy::Refuse);

        let err = stager.prepare().expect_err("cannot create under a file");

        assert!(matches!(err, FetchError::DirectoryCreation { path, .. } if path.ends_with("sub")));
    }

    #[rstest]
    fn place_moves_scratch_to_destination(out: (TempDir, Utf8PathBuf)) {
        let (_temp, root) = out;
        let stager = Stager::new(root.clone(), OverwritePolicy::Refuse);
        let dest = stager.destination("a.tar.gz");

        stager
            .place(scratch_with(&stager, b"new"), &dest)
            .expect("place");

        assert_eq!(fs::read(&dest).expect("read dest"), b"new");
        let leftovers: Vec<_> = fs::read_dir(&root)
            .expect("read dir")
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[rstest]
    fn refuse_policy_rejects_existing_destination(out: (TempDir, Utf8PathBuf)) {
        let (_temp, root) = out;
        let stager = Stager::new(root, OverwritePolicy::Refuse);
        let dest = stager.destination("a.tar.gz");
        fs::write(&dest, b"old").expect("write existing");

        let err = stager.ensure_available(&dest).expect_err("exists");
        assert!(matches!(
            &err,
            FetchError::FileMove { source, .. } if source.kind() == std::io::ErrorKind::AlreadyExists
        ));

        let err = stager
            .place(scratch_with(&stager, b"new"), &dest)
            .expect_err("no clobber");
        assert!(matches!(err, FetchError::FileMove { .. }));
        assert_eq!(fs::read(&dest).expect("read dest"), b"old");
    }

    #[rstest]
    fn replace_policy_overwrites_existing_destination(out: (TempDir, Utf8PathBuf)) {
        let (_temp, root) = out;
        let stager = Stager::new(root, OverwritePolicy::Replace);
        let dest = stager.destination("a.tar.gz");
        fs::write(&dest, b"old").expect("write existing");

        stager.ensure_available(&dest).expect("replace allowed");
        stager
            .place(scratch_with(&stager, b"new"), &dest)
            .expect("place");

        assert_eq!(fs::read(&dest).expect("read dest"), b"new");
    }
}
