//! Release catalog data model.
//!
//! The distribution server publishes a JSON array of releases, newest first:
//!
//! ```json
//! [
//!   {
//!     "version": "go1.21.3",
//!     "stable": true,
//!     "files": [
//!       {
//!         "filename": "go1.21.3.linux-amd64.tar.gz",
//!         "os": "linux",
//!         "arch": "amd64",
//!         "version": "go1.21.3",
//!         "sha256": "1241381b2843fae5a9707eec1f8fb2ef94d827990582c7c7c32f5bdfbfd420c8",
//!         "size": 66612390,
//!         "kind": "archive"
//!       }
//!     ]
//!   }
//! ]
//! ```
//!
//! Entries are kept in the order the server returns them; nothing in vswitch
//! re-sorts the catalog.

use serde::{Deserialize, Serialize};

/// Artifact kind the installer knows how to unpack.
pub const ARCHIVE_KIND: &str = "archive";

/// One downloadable file of a release.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseArtifact {
    pub filename: String,
    pub os: String,
    pub arch: String,
    #[serde(default)]
    pub version: String,
    /// Lowercase hex SHA-256 of the file. Empty when the catalog omits it.
    #[serde(default)]
    pub sha256: String,
    #[serde(default)]
    pub size: u64,
    /// One of `archive`, `source` or `installer`.
    pub kind: String,
}

/// One release in the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Raw version string, including the runtime prefix (e.g. `go1.21.3`).
    pub version: String,
    pub stable: bool,
    #[serde(default)]
    pub files: Vec<ReleaseArtifact>,
}

impl CatalogEntry {
    /// Returns the version with `prefix` stripped, e.g. `go1.21.3` -> `1.21.3`.
    #[must_use]
    pub fn display_name(&self, prefix: &str) -> &str {
        self.version.strip_prefix(prefix).unwrap_or(&self.version)
    }

    /// Returns the archive artifact for `os`/`arch`.
    ///
    /// When the catalog lists several matching archives the last one wins.
    #[must_use]
    pub fn find_archive(&self, os: &str, arch: &str) -> Option<&ReleaseArtifact> {
        self.files
            .iter()
            .rev()
            .find(|file| file.os == os && file.arch == arch && file.kind == ARCHIVE_KIND)
    }
}
