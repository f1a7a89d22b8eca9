//! The version manager: core operations wired over injected capabilities.
//!
//! [`VersionManager`] owns the configuration, the derived on-disk layout and
//! one implementation of each capability (release source, file system, clock,
//! extractor). Commands resolve the catalog once with
//! [`VersionManager::get_versions`] and pass the resulting slice to the other
//! operations.

use std::sync::Arc;

use crate::config::Config;

use super::archive::{Extractor, TarGzExtractor};
use super::cache::CatalogCache;
use super::client::{HttpReleaseSource, ReleaseSource};
use super::clock::{Clock, SystemClock};
use super::fs::{FileSystem, OsFileSystem};
use super::installer::{Installer, StageCallback};
use super::paths::Paths;
use super::prune::{self, PartialPrune};
use super::resolver::{self, ResolvedVersion};
use super::semver::{self, Semver};
use super::{Result, VswitchError};

pub struct VersionManager {
    config: Config,
    paths: Paths,
    source: Arc<dyn ReleaseSource>,
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
    extractor: Arc<dyn Extractor>,
}

impl VersionManager {
    /// Creates a manager and makes sure the data directories exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the data root, versions or bin directory cannot be
    /// created.
    pub fn new(
        config: Config,
        source: Arc<dyn ReleaseSource>,
        fs: Arc<dyn FileSystem>,
        clock: Arc<dyn Clock>,
        extractor: Arc<dyn Extractor>,
    ) -> Result<Self> {
        let paths = Paths::from_config(&config);
        paths.ensure_directories(fs.as_ref())?;

        Ok(Self {
            config,
            paths,
            source,
            fs,
            clock,
            extractor,
        })
    }

    /// Creates a manager backed by HTTP, the real file system and the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the data
    /// directories cannot be created.
    pub fn from_config(config: Config) -> Result<Self> {
        let source = HttpReleaseSource::from_config(&config)?;
        Self::new(
            config,
            Arc::new(source),
            Arc::new(OsFileSystem),
            Arc::new(SystemClock),
            Arc::new(TarGzExtractor),
        )
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Loads the catalog (cached or fetched) and annotates it with local state.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be fetched, stored or parsed.
    pub async fn get_versions(&self, force_refresh: bool) -> Result<Vec<ResolvedVersion>> {
        let cache = CatalogCache::new(
            self.source.as_ref(),
            self.fs.as_ref(),
            self.clock.as_ref(),
            self.paths.cache_file(),
            self.config.cache_ttl_hours,
        );
        let entries = cache.fetch_or_load(force_refresh).await?;
        Ok(resolver::annotate(
            entries,
            &self.paths,
            self.fs.as_ref(),
            &self.config.version_prefix,
        ))
    }

    #[must_use]
    pub fn find_version_by_semver<'a>(
        &self,
        resolved: &'a [ResolvedVersion],
        pattern: &Semver,
    ) -> Option<&'a ResolvedVersion> {
        semver::find_match(resolved, pattern)
    }

    #[must_use]
    pub fn get_latest_stable<'a>(&self, resolved: &'a [ResolvedVersion]) -> Option<&'a ResolvedVersion> {
        resolver::select_latest_stable(resolved)
    }

    #[must_use]
    pub fn filter_for_display<'a>(
        &self,
        resolved: &'a [ResolvedVersion],
        include_unstable: bool,
    ) -> Vec<&'a ResolvedVersion> {
        resolver::filter_for_display(resolved, include_unstable)
    }

    /// Installs `version` for `os`/`arch`, or just activates it if it is
    /// already on disk.
    ///
    /// # Errors
    ///
    /// Returns [`VswitchError::ArtifactNotFound`] if the release has no archive
    /// for the platform, [`VswitchError::ChecksumNotDeclared`] if that archive
    /// has no checksum, or the error of the failing install stage.
    ///
    /// The CLI reports progress and goes through
    /// [`VersionManager::install_with_progress`] instead.
    #[allow(dead_code)]
    pub async fn install(&self, version: &ResolvedVersion, os: &str, arch: &str) -> Result<()> {
        self.install_inner(version, os, arch, None).await
    }

    /// Like [`VersionManager::install`], reporting each stage to `on_stage`.
    ///
    /// # Errors
    ///
    /// See [`VersionManager::install`].
    pub async fn install_with_progress(
        &self,
        version: &ResolvedVersion,
        os: &str,
        arch: &str,
        on_stage: StageCallback<'_>,
    ) -> Result<()> {
        self.install_inner(version, os, arch, Some(on_stage)).await
    }

    async fn install_inner(
        &self,
        version: &ResolvedVersion,
        os: &str,
        arch: &str,
        on_stage: Option<StageCallback<'_>>,
    ) -> Result<()> {
        let mut installer = Installer::new(
            self.source.as_ref(),
            self.fs.as_ref(),
            self.extractor.as_ref(),
            self.clock.as_ref(),
            &self.paths,
        );
        if let Some(callback) = on_stage {
            installer = installer.with_stage_callback(callback);
        }

        if version.already_installed {
            tracing::info!(version = version.version(), "activating installed version");
            return installer.activate_existing(version.version());
        }

        let artifact = version
            .entry
            .find_archive(os, arch)
            .ok_or_else(|| VswitchError::artifact_not_found(os, arch))?;

        if artifact.sha256.is_empty() {
            return Err(VswitchError::checksum_not_declared(os, arch));
        }

        tracing::info!(
            version = version.version(),
            filename = %artifact.filename,
            "installing new version"
        );
        installer
            .install_new(&artifact.filename, &artifact.sha256, version.version())
            .await
    }

    /// Deletes every installed version except the active one.
    ///
    /// # Errors
    ///
    /// See [`prune::delete_unused_versions`].
    pub fn delete_unused_versions(
        &self,
        resolved: &[ResolvedVersion],
    ) -> std::result::Result<Vec<String>, PartialPrune> {
        prune::delete_unused_versions(resolved, &self.paths, self.fs.as_ref())
    }
}
