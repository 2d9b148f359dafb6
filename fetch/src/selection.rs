//! Case-insensitive project selection.
//!
//! A [`Selection`] is the caller's allow-list of project names. An empty
//! selection admits every project.

use crate::manifest::{ProjectEntry, ReleaseManifest};
use std::collections::BTreeSet;

/// An allow-list of lowercased project names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    names: BTreeSet<String>,
}

impl Selection {
    /// Build a selection from caller-supplied names.
    ///
    /// # Examples
    ///
    /// ```
    /// use opensource_fetch::selection::Selection;
    ///
    /// let selection = Selection::new(["Dyld", "libc"]);
    /// assert!(selection.admits_name("DYLD"));
    /// assert!(!selection.admits_name("zlib"));
    /// ```
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Return true when the selection admits every project.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Return true when `name` passes the selection.
    #[must_use]
    pub fn admits_name(&self, name: &str) -> bool {
        self.is_empty() || self.names.contains(&name.to_lowercase())
    }

    /// Return true when the project passes the selection.
    ///
    /// A project without a name is matched by its manifest identifier.
    #[must_use]
    pub fn admits(&self, id: &str, entry: &ProjectEntry) -> bool {
        self.admits_name(entry.name().unwrap_or(id))
    }

    /// Iterate over the manifest projects admitted by this selection, in
    /// manifest order.
    pub fn filter<'a>(
        &'a self,
        manifest: &'a ReleaseManifest,
    ) -> impl Iterator<Item = (&'a str, &'a ProjectEntry)> + 'a {
        manifest
            .projects()
            .filter(move |(id, entry)| self.admits(id, entry))
    }
}
