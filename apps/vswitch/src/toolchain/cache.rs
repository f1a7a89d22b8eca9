//! TTL-bounded local copy of the release catalog.
//!
//! The catalog is stored verbatim as JSON in the data root. It is re-fetched
//! when a refresh is forced, when no cache exists, or when the cache file is
//! older than the configured lifetime. A cache that exists but cannot be
//! parsed is reported as an error rather than silently re-fetched.

use std::path::PathBuf;

use super::catalog::CatalogEntry;
use super::client::ReleaseSource;
use super::clock::Clock;
use super::fs::FileSystem;
use super::{Result, VswitchError};

/// Reads and refreshes the cached catalog.
pub struct CatalogCache<'a> {
    source: &'a dyn ReleaseSource,
    fs: &'a dyn FileSystem,
    clock: &'a dyn Clock,
    cache_file: PathBuf,
    ttl_hours: u64,
}

impl<'a> CatalogCache<'a> {
    pub fn new(
        source: &'a dyn ReleaseSource,
        fs: &'a dyn FileSystem,
        clock: &'a dyn Clock,
        cache_file: PathBuf,
        ttl_hours: u64,
    ) -> Self {
        Self {
            source,
            fs,
            clock,
            cache_file,
            ttl_hours,
        }
    }

    /// Returns `true` if a cache file exists and is younger than the TTL.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        match self.fs.modified(&self.cache_file) {
            #[allow(clippy::cast_precision_loss)]
            Ok(modified) => self.clock.hours_since(modified) < self.ttl_hours as f64,
            Err(_) => false,
        }
    }

    /// Returns the catalog, fetching it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails (the existing cache is left
    /// untouched), the cache cannot be written or read, or the cached bytes
    /// are not a valid catalog.
    pub async fn fetch_or_load(&self, force_refresh: bool) -> Result<Vec<CatalogEntry>> {
        if force_refresh || !self.is_fresh() {
            tracing::info!(force_refresh, "catalog cache miss, fetching");
            let entries = self.source.fetch_catalog().await?;
            self.store(&entries)?;
            return Ok(entries);
        }

        tracing::debug!(path = %self.cache_file.display(), "catalog cache hit");
        let bytes = self.fs.read(&self.cache_file).map_err(|e| {
            VswitchError::io(
                format!("failed to read cached catalog {}", self.cache_file.display()),
                e,
            )
        })?;
        serde_json::from_slice(&bytes).map_err(|source| VswitchError::CatalogParse { source })
    }

    fn store(&self, entries: &[CatalogEntry]) -> Result<()> {
        let bytes =
            serde_json::to_vec(entries).map_err(|source| VswitchError::CatalogParse { source })?;
        self.fs.write(&self.cache_file, &bytes).map_err(|e| {
            VswitchError::io(
                format!("failed to write catalog cache {}", self.cache_file.display()),
                e,
            )
        })
    }
}
