//! Release manifest lookup.
//!
//! The metadata service is addressed by a base URL. Manifests live at
//! `<base>/<moniker>.json`. An `http`/`https` base is queried with `ureq`;
//! a `file` base names a local directory of manifest documents, which is
//! useful for mirrors and offline work.

use camino::Utf8PathBuf;
use url::Url;

use super::http::{DEFAULT_CONNECT_TIMEOUT, http_agent, is_not_found};
use crate::manifest::{ManifestParseError, ReleaseManifest, parse_manifest};
use crate::moniker::Moniker;

/// Trait for resolving a release manifest by moniker.
#[cfg_attr(test, mockall::automock)]
pub trait MetadataSource {
    /// Fetch the manifest for `moniker`.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::NotFound`] when the service has no entry for
    /// the moniker, and another variant when the request or decoding fails.
    fn fetch_manifest(&self, moniker: &Moniker) -> Result<ReleaseManifest, MetadataError>;
}

/// Errors arising from manifest lookup.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// The service has no manifest for the moniker.
    #[error("no manifest found for {moniker} at {location}")]
    NotFound {
        /// The moniker that was looked up.
        moniker: String,
        /// Where the manifest was expected.
        location: String,
    },

    /// The request could not be completed.
    #[error("manifest request to {location} failed: {reason}")]
    Request {
        /// Where the manifest was requested from.
        location: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The response body was not a valid manifest.
    #[error("invalid manifest at {location}: {source}")]
    Parse {
        /// Where the manifest was read from.
        location: String,
        /// The underlying parse failure.
        #[source]
        source: ManifestParseError,
    },

    /// The moniker cannot name a manifest document.
    #[error("invalid release moniker {moniker}: contains a path separator")]
    InvalidMoniker {
        /// The rejected moniker.
        moniker: String,
    },

    /// The configured source URL cannot be used.
    #[error("unsupported metadata source {source_url}: {reason}")]
    UnsupportedSource {
        /// The rejected base URL.
        source_url: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Build the manifest location for `moniker` under `base`.
///
/// # Errors
///
/// Returns [`MetadataError::InvalidMoniker`] if the moniker contains a path
/// separator, and [`MetadataError::UnsupportedSource`] if the joined URL does
/// not parse.
///
/// # Examples
///
/// ```
/// use opensource_fetch::moniker::Moniker;
/// use opensource_fetch::remote::metadata::manifest_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.test/releases/").expect("valid URL");
/// let url = manifest_url(&base, &Moniker::new("Foo", "1.2.3")).expect("joined");
/// assert_eq!(url.as_str(), "https://example.test/releases/foo-123.json");
/// ```
pub fn manifest_url(base: &Url, moniker: &Moniker) -> Result<Url, MetadataError> {
    check_moniker(moniker)?;
    let joined = format!("{}/{moniker}.json", base.as_str().trim_end_matches('/'));
    Url::parse(&joined).map_err(|e| MetadataError::UnsupportedSource {
        source_url: base.to_string(),
        reason: e.to_string(),
    })
}

/// Reject monikers that would address a document outside the source root.
fn check_moniker(moniker: &Moniker) -> Result<(), MetadataError> {
    if moniker.as_str().contains(['/', '\\']) {
        return Err(MetadataError::InvalidMoniker {
            moniker: moniker.to_string(),
        });
    }
    Ok(())
}

/// Select the source implementation for a configured base URL.
///
/// # Errors
///
/// Returns [`MetadataError::UnsupportedSource`] for schemes other than
/// `http`, `https`, and `file`, or a `file` URL that is not a UTF-8 path.
pub fn source_for(
    base: &Url,
    agent: ureq::Agent,
) -> Result<Box<dyn MetadataSource>, MetadataError> {
    match base.scheme() {
        "http" | "https" => Ok(Box::new(HttpMetadataSource::new(base.clone(), agent))),
        "file" => {
            let dir = base
                .to_file_path()
                .ok()
                .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
                .ok_or_else(|| MetadataError::UnsupportedSource {
                    source_url: base.to_string(),
                    reason: "not a UTF-8 local path".to_owned(),
                })?;
            Ok(Box::new(LocalMetadataSource::new(dir)))
        }
        other => Err(MetadataError::UnsupportedSource {
            source_url: base.to_string(),
            reason: format!("scheme {other} is not supported"),
        }),
    }
}

/// Metadata source backed by an HTTP service.
#[derive(Debug, Clone)]
pub struct HttpMetadataSource {
    base: Url,
    agent: ureq::Agent,
}

impl HttpMetadataSource {
    /// Create a source rooted at `base`.
    #[must_use]
    pub fn new(base: Url, agent: ureq::Agent) -> Self {
        Self { base, agent }
    }

    /// Create a source rooted at `base` using a default agent.
    #[must_use]
    pub fn with_default_agent(base: Url) -> Self {
        Self::new(base, http_agent(DEFAULT_CONNECT_TIMEOUT))
    }
}

impl MetadataSource for HttpMetadataSource {
    fn fetch_manifest(&self, moniker: &Moniker) -> Result<ReleaseManifest, MetadataError> {
        let url = manifest_url(&self.base, moniker)?;
        let location = url.to_string();
        log::debug!("resolving manifest {moniker} from {location}");

        let response = self.agent.get(url.as_str()).call().map_err(|e| {
            if is_not_found(&e) {
                MetadataError::NotFound {
                    moniker: moniker.to_string(),
                    location: location.clone(),
                }
            } else {
                MetadataError::Request {
                    location: location.clone(),
                    reason: e.to_string(),
                }
            }
        })?;
        let body =
            response
                .into_body()
                .read_to_string()
                .map_err(|e| MetadataError::Request {
                    location: location.clone(),
                    reason: e.to_string(),
                })?;
        decode(moniker, &location, &body)
    }
}

/// Metadata source backed by a directory of `<moniker>.json` files.
#[derive(Debug, Clone)]
pub struct LocalMetadataSource {
    dir: Utf8PathBuf,
}

impl LocalMetadataSource {
    /// Create a source reading manifests from `dir`.
    #[must_use]
    pub fn new(dir: Utf8PathBuf) -> Self {
        Self { dir }
    }
}

impl MetadataSource for LocalMetadataSource {
    fn fetch_manifest(&self, moniker: &Moniker) -> Result<ReleaseManifest, MetadataError> {
        check_moniker(moniker)?;
        let path = self.dir.join(format!("{moniker}.json"));
        let location = path.to_string();
        log::debug!("resolving manifest {moniker} from {location}");

        let body = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MetadataError::NotFound {
                    moniker: moniker.to_string(),
                    location: location.clone(),
                }
            } else {
                MetadataError::Request {
                    location: location.clone(),
                    reason: e.to_string(),
                }
            }
        })?;
        decode(moniker, &location, &body)
    }
}

/// Parse a manifest body; a document without projects counts as not found.
fn decode(moniker: &Moniker, location: &str, body: &str) -> Result<ReleaseManifest, MetadataError> {
    match parse_manifest(body) {
        Ok(manifest) => Ok(manifest),
        Err(ManifestParseError::MissingProjects) => Err(MetadataError::NotFound {
            moniker: moniker.to_string(),
            location: location.to_owned(),
        }),
        Err(source) => Err(MetadataError::Parse {
            location: location.to_owned(),
            source,
        }),
    }
}
