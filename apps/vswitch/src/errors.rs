//! Error types for the vswitch CLI.
//!
//! This module defines the `VswitchError` enum which consolidates every failure
//! the version pipeline can surface: catalog fetching and parsing, version
//! matching, the install state machine, and pruning. The command layer wraps
//! these in `anyhow::Result`; the core returns them directly so callers can
//! match on the variant.

use std::path::PathBuf;
use thiserror::Error;

/// Consolidated error type for vswitch operations.
#[derive(Debug, Error)]
pub enum VswitchError {
    /// The remote catalog could not be fetched.
    #[error("failed to fetch release catalog: {message}")]
    CatalogFetch {
        /// Description of the failure, including the HTTP status if any.
        message: String,
        /// The underlying transport error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Cached or fetched catalog bytes are not a valid JSON array of releases.
    #[error("failed to parse release catalog: {source}")]
    CatalogParse {
        #[source]
        source: serde_json::Error,
    },

    /// A user supplied version specifier does not follow `major(.minor)?(.patch|rcN)?`.
    #[error("invalid version format: {input}")]
    InvalidVersionFormat {
        /// The rejected input.
        input: String,
    },

    /// A specifier parsed fine but nothing in the catalog starts with it.
    #[error("{pattern} is not a valid version")]
    NoMatchingVersion {
        /// The rendered specifier.
        pattern: String,
    },

    /// The catalog contains no stable release.
    #[error("latest stable version not found")]
    NoStableVersion,

    /// No archive artifact exists for the requested platform.
    #[error("installer not found for {os:?} {arch:?}")]
    ArtifactNotFound {
        /// Target operating system (e.g. `linux`).
        os: String,
        /// Target architecture (e.g. `amd64`).
        arch: String,
    },

    /// The archive artifact exists but the catalog declares no checksum for it.
    #[error("checksum not found for {os:?} {arch:?}")]
    ChecksumNotDeclared {
        /// Target operating system.
        os: String,
        /// Target architecture.
        arch: String,
    },

    /// The staged archive digest differs from the declared checksum.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The checksum declared by the catalog.
        expected: String,
        /// The digest computed from the staged bytes.
        actual: String,
    },

    /// The staged archive could not be read while computing its digest.
    #[error("failed to compute checksum of {}", path.display())]
    Checksum {
        /// The staging file.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Downloading an artifact failed.
    #[error("download error: {message}")]
    Download {
        /// Description of the download error.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The staged archive is not a readable gzip-compressed tar.
    #[error("extraction failed: {message}")]
    Extraction {
        /// Description of the extraction error.
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// An archive entry would be written outside the extraction root.
    #[error("invalid file path: {}", path.display())]
    PathTraversal {
        /// The resolved destination that escaped the root.
        path: PathBuf,
    },

    /// The extracted directory could not be renamed to the version name.
    #[error("failed to relocate extracted release: {message}")]
    Relocation {
        /// Description of the relocation failure.
        message: String,
    },

    /// The active-version links could not be replaced.
    #[error("failed to switch active version: {message}")]
    Symlink {
        /// Description of the link operation that failed.
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The staging file could not be removed after a successful relocation.
    #[error("failed to remove staging file {}", path.display())]
    StagingCleanup {
        /// The staging file.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Pruning requires a known active version.
    #[error("there is no installed version")]
    NoInstalledVersions,

    /// Deleting a version directory failed mid-prune.
    #[error("an error occurred while deleting {version:?}: {source}")]
    DeleteVersionFailed {
        /// The version whose directory could not be deleted.
        version: String,
        #[source]
        source: std::io::Error,
    },

    /// Error reading or writing files.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O operation that failed.
        message: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration file or environment override.
    #[error("configuration error: {message}")]
    Config {
        /// Description of what was invalid.
        message: String,
    },
}

impl VswitchError {
    /// Creates a new `CatalogFetch` error without an underlying source.
    #[must_use]
    pub fn catalog_fetch(message: impl Into<String>) -> Self {
        Self::CatalogFetch {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `CatalogFetch` error with a source error.
    #[must_use]
    pub fn catalog_fetch_with_source(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::CatalogFetch {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new `InvalidVersionFormat` error.
    #[must_use]
    pub fn invalid_version_format(input: impl Into<String>) -> Self {
        Self::InvalidVersionFormat {
            input: input.into(),
        }
    }

    /// Creates a new `NoMatchingVersion` error.
    #[must_use]
    pub fn no_matching_version(pattern: impl Into<String>) -> Self {
        Self::NoMatchingVersion {
            pattern: pattern.into(),
        }
    }

    /// Creates a new `ArtifactNotFound` error.
    #[must_use]
    pub fn artifact_not_found(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self::ArtifactNotFound {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Creates a new `ChecksumNotDeclared` error.
    #[must_use]
    pub fn checksum_not_declared(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self::ChecksumNotDeclared {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Creates a new `ChecksumMismatch` error.
    #[must_use]
    pub fn checksum_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ChecksumMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a new `Download` error.
    #[must_use]
    pub fn download_error(message: impl Into<String>) -> Self {
        Self::Download {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `Download` error with a source error.
    #[must_use]
    pub fn download_error_with_source(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Download {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new `Extraction` error wrapping an I/O failure.
    #[must_use]
    pub fn extraction(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Extraction {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new `Relocation` error.
    #[must_use]
    pub fn relocation(message: impl Into<String>) -> Self {
        Self::Relocation {
            message: message.into(),
        }
    }

    /// Creates a new `Io` error from an I/O error with context.
    #[must_use]
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Creates a new `Config` error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_mismatch_displays_both_values() {
        let err = VswitchError::checksum_mismatch("abc123", "def456");
        assert_eq!(
            err.to_string(),
            "checksum mismatch: expected abc123, got def456"
        );
    }

    #[test]
    fn artifact_not_found_displays_platform() {
        let err = VswitchError::artifact_not_found("linux", "amd64");
        assert_eq!(err.to_string(), "installer not found for \"linux\" \"amd64\"");
    }

    #[test]
    fn checksum_not_declared_displays_platform() {
        let err = VswitchError::checksum_not_declared("darwin", "arm64");
        assert_eq!(err.to_string(), "checksum not found for \"darwin\" \"arm64\"");
    }

    #[test]
    fn no_matching_version_displays_pattern() {
        let err = VswitchError::no_matching_version("1.99");
        assert_eq!(err.to_string(), "1.99 is not a valid version");
    }

    #[test]
    fn delete_version_failed_keeps_source() {
        let err = VswitchError::DeleteVersionFailed {
            version: "1.20.5".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("\"1.20.5\""));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn path_traversal_displays_path() {
        let err = VswitchError::PathTraversal {
            path: PathBuf::from("/tmp/evil"),
        };
        assert_eq!(err.to_string(), "invalid file path: /tmp/evil");
    }
}
