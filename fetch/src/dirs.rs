//! Directory resolution abstraction for platform-specific paths.
//!
//! Wraps `directories-next` and the process working directory behind a trait
//! so configuration lookup can be tested without touching the real home
//! directory.

use std::path::PathBuf;

/// Application name used for the per-user configuration directory.
pub const APP_NAME: &str = "opensource-fetch";

/// Source of the directories the fetcher reads from by default.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// Per-user configuration directory for this application.
    fn config_dir(&self) -> Option<PathBuf>;

    /// The process working directory, used as the default output directory.
    fn current_dir(&self) -> Option<PathBuf>;
}

/// [`BaseDirs`] backed by the host platform.
///
/// # Examples
///
/// ```
/// use opensource_fetch::dirs::{BaseDirs, SystemBaseDirs};
///
/// let dirs = SystemBaseDirs;
/// assert!(dirs.current_dir().is_some());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn config_dir(&self) -> Option<PathBuf> {
        directories_next::ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn current_dir(&self) -> Option<PathBuf> {
        match std::env::current_dir() {
            Ok(path) => Some(path),
            Err(e) => {
                log::trace!("current_dir: failed to get current dir: {e}");
                None
            }
        }
    }
}
