//! Project archive download.
//!
//! Provides a trait-based abstraction for downloading a project's source
//! archive, enabling dependency injection for testing.

use percent_encoding::percent_decode_str;
use std::path::Path;
use url::Url;

use super::http::{DEFAULT_CONNECT_TIMEOUT, http_agent, is_not_found};

/// Trait for downloading project archives.
///
/// Abstractions allow tests to mock HTTP behaviour without network access.
///
/// # Examples
///
/// ```
/// use opensource_fetch::remote::download::HttpDownloader;
///
/// let downloader = HttpDownloader::default();
/// // Use downloader.download(&url, dest) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveDownloader {
    /// Download the archive at `url` into the file at `dest`.
    ///
    /// The call blocks until the body has been written or the transfer has
    /// failed. `dest` is truncated before writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request, the transfer, or the file write fails.
    fn download(&self, url: &Url, dest: &Path) -> Result<(), DownloadError>;
}

/// Errors arising from archive download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested archive was not found (HTTP 404).
    #[error("archive not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// I/O error while transferring or writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based downloader using `ureq`.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    agent: ureq::Agent,
}

impl HttpDownloader {
    /// Create a downloader that issues requests through `agent`.
    #[must_use]
    pub fn new(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new(http_agent(DEFAULT_CONNECT_TIMEOUT))
    }
}

impl ArchiveDownloader for HttpDownloader {
    fn download(&self, url: &Url, dest: &Path) -> Result<(), DownloadError> {
        let url = url.as_str();
        log::debug!("GET {url}");
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut file = std::fs::File::create(dest)?;
        let written = std::io::copy(&mut response.into_body().as_reader(), &mut file)
            .map_err(DownloadError::Io)?;
        log::debug!("wrote {written} bytes to {}", dest.display());
        Ok(())
    }
}

/// Return the archive file name for a project URL: its last path segment,
/// percent-decoded.
///
/// Returns `None` when the URL has no usable final segment, for example a
/// bare host, a trailing slash, or a segment that decodes to `.`, `..`, or
/// a name containing a path separator.
///
/// # Examples
///
/// ```
/// use opensource_fetch::remote::download::archive_filename;
/// use url::Url;
///
/// let url = Url::parse("https://example.test/tarballs/Foo%20Bar-1.0.tar.gz")
///     .expect("valid URL");
/// assert_eq!(archive_filename(&url).as_deref(), Some("Foo Bar-1.0.tar.gz"));
/// ```
#[must_use]
pub fn archive_filename(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    let decoded = percent_decode_str(segment).decode_utf8().ok()?;
    let usable = !decoded.is_empty()
        && decoded != "."
        && decoded != ".."
        && !decoded.contains(['/', '\\']);
    usable.then(|| decoded.into_owned())
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    if is_not_found(err) {
        return DownloadError::NotFound {
            url: url.to_owned(),
        };
    }
    DownloadError::HttpError {
        url: url.to_owned(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::serve_once;
    use rstest::rstest;

    #[rstest]
    #[case::tarball("https://example.test/a/b/c.tar.gz", Some("c.tar.gz"))]
    #[case::query_ignored("https://example.test/c.zip?sig=abc", Some("c.zip"))]
    #[case::trailing_slash("https://example.test/dir/", None)]
    #[case::bare_host("https://example.test", None)]
    #[case::encoded_space(
        "https://example.test/tarballs/Foo%20Bar-1.0.tar.gz",
        Some("Foo Bar-1.0.tar.gz")
    )]
    #[case::encoded_slash("https://example.test/a%2Fb.tar.gz", None)]
    #[case::encoded_backslash("https://example.test/a%5Cb.tar", None)]
    #[case::encoded_parent("https://example.test/tarballs/%2E%2E", None)]
    #[case::invalid_utf8("https://example.test/a%FF.tar", None)]
    fn derives_archive_filename(#[case] raw: &str, #[case] expected: Option<&str>) {
        let url = Url::parse(raw).expect("valid URL");
        assert_eq!(archive_filename(&url).as_deref(), expected);
    }

    #[test]
    fn non_hierarchical_urls_have_no_filename() {
        let url = Url::parse("mailto:someone@example.test").expect("valid URL");
        assert_eq!(archive_filename(&url), None);
    }

    #[test]
    fn map_ureq_error_maps_404_to_not_found() {
        let err = ureq::Error::StatusCode(404);
        let mapped = map_ureq_error("https://example.test/a.tar.gz", &err);
        assert!(matches!(mapped, DownloadError::NotFound { .. }));
    }

    #[test]
    fn map_ureq_error_maps_other_status_to_http_error() {
        let err = ureq::Error::StatusCode(500);
        let mapped = map_ureq_error("https://example.test/a.tar.gz", &err);
        assert!(matches!(mapped, DownloadError::HttpError { .. }));
    }

    #[test]
    fn downloads_body_to_destination() {
        let server = serve_once(200, b"archive bytes".to_vec());
        let temp = tempfile::tempdir().expect("temp dir");
        let dest = temp.path().join("a.tar.gz");
        let url = Url::parse(&format!("{}/a.tar.gz", server.base_url())).expect("valid URL");

        HttpDownloader::default()
            .download(&url, &dest)
            .expect("download succeeds");

        assert_eq!(std::fs::read(&dest).expect("read dest"), b"archive bytes");
        assert_eq!(server.request_path(), "/a.tar.gz");
    }

    #[test]
    fn not_found_response_maps_to_not_found() {
        let server = serve_once(404, Vec::new());
        let temp = tempfile::tempdir().expect("temp dir");
        let dest = temp.path().join("missing.tar.gz");
        let url =
            Url::parse(&format!("{}/missing.tar.gz", server.base_url())).expect("valid URL");

        let err = HttpDownloader::default()
            .download(&url, &dest)
            .expect_err("download fails");

        assert!(matches!(err, DownloadError::NotFound { .. }), "got {err:?}");
        assert!(!dest.exists(), "no file should be written on HTTP failure");
    }
}
