//! Layout of persisted local state.
//!
//! ```text
//! <root>/
//!   config.toml
//!   versions.json        cached catalog
//!   vswitch.log
//!   versions/
//!     CURRENT            active-version marker
//!     download.tar.gz    staging file
//!     <version>/
//!   bin/                 symlinks to the active version's executables
//! ```

use std::path::PathBuf;

use crate::config::Config;

use super::fs::FileSystem;
use super::{Result, VswitchError};

const CACHE_FILE: &str = "versions.json";
/// Name of the log file inside the data root.
pub const LOG_FILE: &str = "vswitch.log";
const VERSIONS_DIR: &str = "versions";
const MARKER_FILE: &str = "CURRENT";
const STAGING_FILE: &str = "download.tar.gz";

/// Paths of every file and directory vswitch manages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Data root.
    pub root: PathBuf,
    /// Directory holding one subdirectory per installed version.
    pub versions: PathBuf,
    /// Shared directory holding executable symlinks.
    pub bin: PathBuf,
}

impl Paths {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            versions: config.root.join(VERSIONS_DIR),
            bin: config.bin_dir.clone(),
            root: config.root.clone(),
        }
    }

    /// Cached catalog bytes.
    #[must_use]
    pub fn cache_file(&self) -> PathBuf {
        self.root.join(CACHE_FILE)
    }

    /// Active-version marker.
    #[must_use]
    pub fn marker_file(&self) -> PathBuf {
        self.versions.join(MARKER_FILE)
    }

    /// Single staging location for the archive being installed.
    #[must_use]
    pub fn staging_file(&self) -> PathBuf {
        self.versions.join(STAGING_FILE)
    }

    #[must_use]
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.versions.join(version)
    }

    /// Directory whose files are exposed through [`Paths::bin`].
    #[must_use]
    pub fn version_bin_dir(&self, version: &str) -> PathBuf {
        self.version_dir(version).join("bin")
    }

    /// Creates the root, versions and bin directories if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if any directory cannot be created.
    pub fn ensure_directories(&self, fs: &dyn FileSystem) -> Result<()> {
        for dir in [&self.root, &self.versions, &self.bin] {
            fs.create_dir_all(dir).map_err(|e| {
                VswitchError::io(format!("failed to create directory {}", dir.display()), e)
            })?;
        }
        Ok(())
    }

    /// Returns the persisted active version, if any.
    ///
    /// A missing, unreadable or blank marker yields `None`.
    #[must_use]
    pub fn active_version(&self, fs: &dyn FileSystem) -> Option<String> {
        let content = match fs.read_to_string(&self.marker_file()) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(error = %e, "active-version marker not readable");
                return None;
            }
        };
        let version = content.trim();
        if version.is_empty() {
            None
        } else {
            Some(version.to_string())
        }
    }

    /// Overwrites the active-version marker with `version`.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker cannot be written.
    pub fn set_active_version(&self, fs: &dyn FileSystem, version: &str) -> Result<()> {
        let marker = self.marker_file();
        fs.write(&marker, version.as_bytes()).map_err(|e| {
            VswitchError::io(
                format!("failed to write active version to {}", marker.display()),
                e,
            )
        })
    }
}
