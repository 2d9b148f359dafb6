//! Error types for the fetch command.
//!
//! Each variant names the step that failed and the object it failed on, so
//! the single line printed to standard error is enough to act on. Lower
//! layers keep their own error types, wrapped here as sources.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::archive::extraction::ExtractionError;
use crate::config::ConfigError;
use crate::moniker::Moniker;
use crate::remote::download::DownloadError;
use crate::remote::metadata::MetadataError;

/// Errors that abort a fetch run.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Configuration could not be resolved.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The metadata service has no manifest for the release.
    #[error("no manifest found for {moniker} at {location}")]
    ManifestNotFound {
        /// The release moniker that was looked up.
        moniker: String,
        /// Where the manifest was expected.
        location: String,
    },

    /// The manifest could not be retrieved or decoded.
    #[error("failed to fetch manifest for {moniker}: {source}")]
    ManifestRequest {
        /// The release moniker that was looked up.
        moniker: String,
        /// The underlying lookup failure.
        #[source]
        source: MetadataError,
    },

    /// The output directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreation {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A selected project has no archive URL.
    #[error("project {project} has no archive URL")]
    MissingUrl {
        /// Identifier of the project.
        project: String,
    },

    /// A project's archive URL is malformed or has no file name.
    #[error("invalid archive URL for project {project} ({url}): {reason}")]
    UrlParse {
        /// Identifier of the project.
        project: String,
        /// The rejected URL text.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Downloading a project's archive failed.
    #[error("failed to download project {project}: {source}")]
    Download {
        /// Identifier of the project.
        project: String,
        /// The underlying download failure.
        #[source]
        source: DownloadError,
    },

    /// The downloaded archive could not be placed at its destination.
    #[error("failed to move archive to {path}: {source}")]
    FileMove {
        /// Intended destination of the archive.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Extracting a downloaded archive failed.
    #[error("failed to extract {path}: {source}")]
    Extraction {
        /// The archive being extracted.
        path: Utf8PathBuf,
        /// The underlying extraction failure.
        #[source]
        source: ExtractionError,
    },

    /// Failed to write progress output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Classify a manifest lookup failure for `moniker`.
    ///
    /// A missing manifest becomes [`FetchError::ManifestNotFound`]; every
    /// other failure is wrapped in [`FetchError::ManifestRequest`].
    #[must_use]
    pub fn from_metadata(moniker: &Moniker, err: MetadataError) -> Self {
        match err {
            MetadataError::NotFound { moniker, location } => {
                Self::ManifestNotFound { moniker, location }
            }
            source => Self::ManifestRequest {
                moniker: moniker.to_string(),
                source,
            },
        }
    }
}

/// Result type alias using [`FetchError`].
pub type Result<T> = std::result::Result<T, FetchError>;
