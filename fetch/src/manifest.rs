//! Release manifest schema and parsing.
//!
//! The metadata service describes each release as a JSON object whose
//! `projects` table maps a project identifier to its display name and the
//! URL of its source archive:
//!
//! ```json
//! {
//!   "projects": {
//!     "dyld-832.7.3": {
//!       "name": "dyld",
//!       "url": "https://example.org/tarballs/dyld/dyld-832.7.3.tar.gz"
//!     }
//!   }
//! }
//! ```
//!
//! Unknown top-level fields are ignored so that richer service responses
//! still parse.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single source project listed in a release manifest.
///
/// Both fields may be absent in service responses; callers decide how a
/// missing value affects processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    /// Human-readable project name used for selection matching.
    #[serde(default)]
    pub name: Option<String>,
    /// Download location of the project's source archive.
    #[serde(default)]
    pub url: Option<String>,
}

impl ProjectEntry {
    /// Create an entry with both fields present.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
        }
    }

    /// Return the project name, if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return the archive URL, if present.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// The set of source projects that make up a product release.
///
/// Projects are stored by identifier in a [`BTreeMap`], so iteration order
/// is the identifier order and is stable across runs.
///
/// # Examples
///
/// ```
/// use opensource_fetch::manifest::{ProjectEntry, ReleaseManifest};
///
/// let manifest = ReleaseManifest::from_iter([
///     ("b", ProjectEntry::new("B", "https://example.test/b.tar.gz")),
///     ("a", ProjectEntry::new("A", "https://example.test/a.tar.gz")),
/// ]);
/// let ids: Vec<&str> = manifest.projects().map(|(id, _)| id).collect();
/// assert_eq!(ids, ["a", "b"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseManifest {
    projects: BTreeMap<String, ProjectEntry>,
}

impl ReleaseManifest {
    /// Create a manifest from an identifier-to-entry table.
    #[must_use]
    pub fn new(projects: BTreeMap<String, ProjectEntry>) -> Self {
        Self { projects }
    }

    /// Iterate over `(identifier, entry)` pairs in stored order.
    pub fn projects(&self) -> impl Iterator<Item = (&str, &ProjectEntry)> {
        self.projects.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    /// Look up a project by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ProjectEntry> {
        self.projects.get(id)
    }

    /// Number of projects listed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Return true when the manifest lists no projects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ProjectEntry)> for ReleaseManifest {
    fn from_iter<I: IntoIterator<Item = (K, ProjectEntry)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(id, entry)| (id.into(), entry))
                .collect(),
        )
    }
}

/// Errors arising from manifest parsing.
#[derive(Debug, thiserror::Error)]
pub enum ManifestParseError {
    /// JSON deserialization failed.
    #[error("manifest parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but carries no `projects` table.
    #[error("manifest has no projects table")]
    MissingProjects,
}

#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    projects: Option<BTreeMap<String, ProjectEntry>>,
}

/// Parse a JSON document into a [`ReleaseManifest`].
///
/// # Errors
///
/// Returns [`ManifestParseError::Json`] if the document is malformed and
/// [`ManifestParseError::MissingProjects`] if it has no `projects` table
/// (including an explicit `null`).
///
/// # Examples
///
/// ```
/// use opensource_fetch::manifest::parse_manifest;
///
/// let json = r#"{"projects":{"dyld":{"name":"dyld","url":"https://example.test/dyld.tar.gz"}}}"#;
/// let manifest = parse_manifest(json).expect("valid manifest");
/// assert_eq!(manifest.len(), 1);
/// assert_eq!(manifest.get("dyld").and_then(|p| p.name()), Some("dyld"));
/// ```
pub fn parse_manifest(json: &str) -> Result<ReleaseManifest, ManifestParseError> {
    let raw: RawManifest = serde_json::from_str(json)?;
    raw.projects
        .map(ReleaseManifest::new)
        .ok_or(ManifestParseError::MissingProjects)
}
