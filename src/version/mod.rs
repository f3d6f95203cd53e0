//! Local and remote version tracking.
//!
//! A [`Version`] is an opaque token compared only for equality. The local
//! copy is persisted by a [`VersionStore`]; the remote copy is fetched every
//! cycle from a [`VersionSource`] and never persisted.
mod remote;
mod store;

pub use remote::{RemoteVersionFetcher, VersionSource};
pub use store::{EnvFile, FileVersionStore, MarkerFile, VersionStore};

use std::fmt;

/// Opaque version token identifying a build.
///
/// Versions carry no ordering; two versions either are the same token or
/// they are not. An absent version is modeled as `Option::None`, so a
/// `Version` is never empty.
///
/// # Examples
///
/// ```
/// use update_runner::Version;
///
/// let v = Version::parse(" 1.1\n").unwrap();
/// assert_eq!(v.as_str(), "1.1");
/// assert!(Version::parse("   ").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    /// Parse a version from raw text, trimming surrounding whitespace.
    ///
    /// Returns `None` when nothing is left after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The version token as text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render an optional version for log lines.
pub(crate) fn display_version(version: Option<&Version>) -> &str {
    version.map(Version::as_str).unwrap_or("<none>")
}
