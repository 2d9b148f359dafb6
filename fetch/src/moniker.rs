//! Release moniker derivation.
//!
//! The metadata service keys each release manifest by a moniker built from
//! the product name and the release identifier, for example `macos-1121` for
//! product `macOS` and release `11.2.1`.

use std::fmt;

/// A derived key identifying a specific product release.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Moniker(String);

impl Moniker {
    /// Derive the moniker for a product release.
    ///
    /// The product name is lowercased; the release identifier is lowercased
    /// and stripped of every `.`. The two parts are joined with `-`.
    ///
    /// # Examples
    ///
    /// ```
    /// use opensource_fetch::moniker::Moniker;
    ///
    /// let moniker = Moniker::new("Foo", "1.2.3");
    /// assert_eq!(moniker.as_str(), "foo-123");
    /// ```
    #[must_use]
    pub fn new(product: &str, release: &str) -> Self {
        let product = product.to_lowercase();
        let release = release.replace('.', "").to_lowercase();
        Self(format!("{product}-{release}"))
    }

    /// Get the moniker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Moniker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Moniker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
