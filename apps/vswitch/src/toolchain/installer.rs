//! Archive installer.
//!
//! A new version moves through
//! `Downloading -> ChecksumVerifying -> Extracting -> Relocating -> SymlinkSwitching -> Done`.
//! An already installed version skips straight to `SymlinkSwitching`.
//!
//! There is no rollback. A failure after extraction leaves the extracted tree
//! on disk, and the next resolution pass reports that version as installed
//! even though the active marker was never updated. Only one install may run
//! at a time against a data root: the staging file and the marker live at
//! fixed locations and are not locked.

use std::fmt;

use super::archive::Extractor;
use super::client::ReleaseSource;
use super::clock::Clock;
use super::fs::{DirEntryInfo, FileSystem};
use super::paths::Paths;
use super::verify::verify_checksum;
use super::{Result, VswitchError};

/// Permission bits applied through each executable symlink.
const LINK_MODE: u32 = 0o700;

/// Stages of the install pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    Downloading,
    ChecksumVerifying,
    Extracting,
    Relocating,
    SymlinkSwitching,
    Done,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Downloading => "downloading",
            Self::ChecksumVerifying => "verifying checksum",
            Self::Extracting => "extracting",
            Self::Relocating => "relocating",
            Self::SymlinkSwitching => "switching symlinks",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Callback invoked when the pipeline enters a stage.
pub type StageCallback<'a> = &'a (dyn Fn(InstallStage) + Send + Sync);

/// Downloads, verifies, unpacks and activates versions.
pub struct Installer<'a> {
    source: &'a dyn ReleaseSource,
    fs: &'a dyn FileSystem,
    extractor: &'a dyn Extractor,
    clock: &'a dyn Clock,
    paths: &'a Paths,
    on_stage: Option<StageCallback<'a>>,
}

impl<'a> Installer<'a> {
    pub fn new(
        source: &'a dyn ReleaseSource,
        fs: &'a dyn FileSystem,
        extractor: &'a dyn Extractor,
        clock: &'a dyn Clock,
        paths: &'a Paths,
    ) -> Self {
        Self {
            source,
            fs,
            extractor,
            clock,
            paths,
            on_stage: None,
        }
    }

    /// Reports every stage transition to `callback`.
    #[must_use]
    pub fn with_stage_callback(mut self, callback: StageCallback<'a>) -> Self {
        self.on_stage = Some(callback);
        self
    }

    fn enter(&self, stage: InstallStage, version: &str) {
        tracing::info!(%version, %stage, "install stage");
        if let Some(callback) = self.on_stage {
            callback(stage);
        }
    }

    /// Installs `version` from the artifact `filename` and makes it active.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing stage. On a checksum failure the
    /// staging file is removed on a best-effort basis and the checksum error
    /// is returned. If removing the staging file fails after a successful
    /// relocation the install fails with [`VswitchError::StagingCleanup`].
    pub async fn install_new(&self, filename: &str, checksum: &str, version: &str) -> Result<()> {
        let staging = self.paths.staging_file();

        self.enter(InstallStage::Downloading, version);
        self.source.download(filename, &staging).await?;

        self.enter(InstallStage::ChecksumVerifying, version);
        if let Err(err) = verify_checksum(self.fs, &staging, checksum) {
            self.discard_staging();
            return Err(err);
        }

        self.enter(InstallStage::Extracting, version);
        let top_level = self.extractor.extract(&staging, &self.paths.versions)?;

        self.enter(InstallStage::Relocating, version);
        self.relocate(&top_level, version)?;

        self.fs
            .remove_file(&staging)
            .map_err(|source| VswitchError::StagingCleanup {
                path: staging.clone(),
                source,
            })?;

        self.switch(version)
    }

    /// Makes an already installed `version` active.
    ///
    /// # Errors
    ///
    /// Returns an error if the symlinks or the marker cannot be written.
    pub fn activate_existing(&self, version: &str) -> Result<()> {
        self.switch(version)
    }

    fn switch(&self, version: &str) -> Result<()> {
        self.enter(InstallStage::SymlinkSwitching, version);
        self.link_executables(version)?;
        self.paths.set_active_version(self.fs, version)?;
        self.enter(InstallStage::Done, version);
        Ok(())
    }

    fn discard_staging(&self) {
        let staging = self.paths.staging_file();
        if let Err(e) = self.fs.remove_file(&staging) {
            tracing::warn!(
                path = %staging.display(),
                error = %e,
                "failed to remove staging file after checksum failure"
            );
        }
    }

    /// Renames the freshly extracted top-level directory to `version`.
    fn relocate(&self, top_level: &[String], version: &str) -> Result<()> {
        let entries = self.fs.read_dir(&self.paths.versions).map_err(|e| {
            VswitchError::relocation(format!(
                "failed to read {}: {e}",
                self.paths.versions.display()
            ))
        })?;
        let dirs: Vec<DirEntryInfo> = entries.into_iter().filter(|e| e.is_dir).collect();

        let reported: Vec<&DirEntryInfo> = dirs
            .iter()
            .filter(|dir| top_level.contains(&dir.name))
            .collect();

        let extracted = match reported.as_slice() {
            [single] => *single,
            _ => newest_directory(self.clock, &dirs).ok_or_else(|| {
                VswitchError::relocation("archive did not produce a directory")
            })?,
        };

        if extracted.name == version {
            return Ok(());
        }

        let target = self.paths.version_dir(version);
        tracing::debug!(from = %extracted.path.display(), to = %target.display(), "relocating");
        self.fs.rename(&extracted.path, &target).map_err(|e| {
            VswitchError::relocation(format!(
                "failed to rename {} to {}: {e}",
                extracted.path.display(),
                target.display()
            ))
        })
    }

    /// Points one symlink in the shared bin directory at every entry of the
    /// version's executable directory.
    fn link_executables(&self, version: &str) -> Result<()> {
        let source_dir = self.paths.version_bin_dir(version);
        let mut entries = self.fs.read_dir(&source_dir).map_err(|source| VswitchError::Symlink {
            message: format!("failed to read {}", source_dir.display()),
            source,
        })?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        for entry in entries {
            let link = self.paths.bin.join(&entry.name);

            if self.fs.is_symlink(&link) || self.fs.exists(&link) {
                self.fs.remove_file(&link).map_err(|source| VswitchError::Symlink {
                    message: format!("failed to remove existing link {}", link.display()),
                    source,
                })?;
            }

            self.fs
                .symlink(&entry.path, &link)
                .map_err(|source| VswitchError::Symlink {
                    message: format!(
                        "failed to link {} to {}",
                        link.display(),
                        entry.path.display()
                    ),
                    source,
                })?;

            self.fs
                .set_mode(&link, LINK_MODE)
                .map_err(|source| VswitchError::Symlink {
                    message: format!("failed to set permissions on {}", link.display()),
                    source,
                })?;

            tracing::debug!(link = %link.display(), "linked executable");
        }

        Ok(())
    }
}

/// Returns the most recently modified directory; ties go to the first seen.
fn newest_directory<'e>(clock: &dyn Clock, dirs: &'e [DirEntryInfo]) -> Option<&'e DirEntryInfo> {
    let mut newest: Option<&DirEntryInfo> = None;
    for dir in dirs {
        match newest {
            Some(current) if !clock.is_after(dir.modified, current.modified) => {}
            _ => newest = Some(dir),
        }
    }
    newest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::toolchain::archive::TarGzExtractor;
    use crate::toolchain::archive::fixtures::release_tar_gz;
    use crate::toolchain::client::testing::FakeSource;
    use crate::toolchain::clock::SystemClock;
    use crate::toolchain::fs::OsFileSystem;
    use crate::toolchain::fs::testing::FaultyFileSystem;
    use assert_fs::TempDir;
    use sha2::{Digest, Sha256};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::time::{Duration, SystemTime};

    const FILENAME: &str = "go1.21.0.linux-amd64.tar.gz";

    fn setup(root: &Path) -> Paths {
        let paths = Paths::from_config(&Config::with_root(root));
        paths
            .ensure_directories(&OsFileSystem)
            .expect("Should create directories");
        paths
    }

    fn release() -> (Vec<u8>, String) {
        let bytes = release_tar_gz("go");
        let checksum = hex::encode(Sha256::digest(&bytes));
        (bytes, checksum)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn install_new_runs_every_stage() {
        let temp = TempDir::new().expect("Should create temp dir");
        let paths = setup(temp.path());
        let (bytes, checksum) = release();
        let source = FakeSource::default().with_artifact(FILENAME, bytes);
        let stages = Mutex::new(Vec::new());
        let record = |stage: InstallStage| stages.lock().expect("lock").push(stage);

        Installer::new(&source, &OsFileSystem, &TarGzExtractor, &SystemClock, &paths)
            .with_stage_callback(&record)
            .install_new(FILENAME, &checksum, "go1.21.0")
            .await
            .expect("Should install");

        assert_eq!(
            *stages.lock().expect("lock"),
            vec![
                InstallStage::Downloading,
                InstallStage::ChecksumVerifying,
                InstallStage::Extracting,
                InstallStage::Relocating,
                InstallStage::SymlinkSwitching,
                InstallStage::Done,
            ]
        );
        assert!(paths.version_dir("go1.21.0").join("bin/go").is_file());
        assert!(!paths.versions.join("go").exists());
        assert!(!paths.staging_file().exists());
        assert_eq!(
            std::fs::read_link(paths.bin.join("go")).expect("Should be a symlink"),
            paths.version_bin_dir("go1.21.0").join("go")
        );
        assert!(paths.bin.join("gofmt").exists());
        assert_eq!(paths.active_version(&OsFileSystem), Some("go1.21.0".to_string()));
    }

    #[tokio::test]
    async fn checksum_mismatch_removes_staging_and_extracts_nothing() {
        let temp = TempDir::new().expect("Should create temp dir");
        let paths = setup(temp.path());
        let (bytes, _) = release();
        let source = FakeSource::default().with_artifact(FILENAME, bytes);

        let result = Installer::new(&source, &OsFileSystem, &TarGzExtractor, &SystemClock, &paths)
            .install_new(FILENAME, "00ff", "go1.21.0")
            .await;

        assert!(matches!(result, Err(VswitchError::ChecksumMismatch { .. })));
        assert!(!paths.staging_file().exists());
        assert!(!paths.version_dir("go1.21.0").exists());
        assert!(!paths.versions.join("go").exists());
        assert_eq!(paths.active_version(&OsFileSystem), None);
    }

    #[tokio::test]
    async fn checksum_mismatch_wins_over_cleanup_failure() {
        let temp = TempDir::new().expect("Should create temp dir");
        let paths = setup(temp.path());
        let (bytes, _) = release();
        let source = FakeSource::default().with_artifact(FILENAME, bytes);
        let fs = FaultyFileSystem::new();
        fs.fail_removal_of(paths.staging_file());

        let result = Installer::new(&source, &fs, &TarGzExtractor, &SystemClock, &paths)
            .install_new(FILENAME, "00ff", "go1.21.0")
            .await;

        assert!(matches!(result, Err(VswitchError::ChecksumMismatch { .. })));
        assert!(paths.staging_file().exists());
    }

    #[tokio::test]
    async fn staging_cleanup_failure_fails_install_after_relocation() {
        let temp = TempDir::new().expect("Should create temp dir");
        let paths = setup(temp.path());
        let (bytes, checksum) = release();
        let source = FakeSource::default().with_artifact(FILENAME, bytes);
        let fs = FaultyFileSystem::new();
        fs.fail_removal_of(paths.staging_file());

        let result = Installer::new(&source, &fs, &TarGzExtractor, &SystemClock, &paths)
            .install_new(FILENAME, &checksum, "go1.21.0")
            .await;

        assert!(matches!(result, Err(VswitchError::StagingCleanup { .. })));
        assert!(paths.version_dir("go1.21.0").join("bin/go").is_file());
        assert_eq!(paths.active_version(&OsFileSystem), None);
    }

    #[tokio::test]
    async fn download_failure_stops_before_verification() {
        let temp = TempDir::new().expect("Should create temp dir");
        let paths = setup(temp.path());
        let source = FakeSource::default();

        let result = Installer::new(&source, &OsFileSystem, &TarGzExtractor, &SystemClock, &paths)
            .install_new(FILENAME, "00ff", "go1.21.0")
            .await;

        assert!(matches!(result, Err(VswitchError::Download { .. })));
        assert_eq!(source.downloads(), 1);
        assert!(!paths.version_dir("go1.21.0").exists());
    }

    #[tokio::test]
    async fn interrupted_download_leaves_partial_staging_file() {
        let temp = TempDir::new().expect("Should create temp dir");
        let paths = setup(temp.path());
        let (bytes, checksum) = release();
        let partial = bytes[..bytes.len() / 2].to_vec();
        let source = FakeSource::default().with_truncated_artifact(FILENAME, partial.clone());
        let stages = Mutex::new(Vec::new());
        let record = |stage: InstallStage| stages.lock().expect("lock").push(stage);

        let result = Installer::new(&source, &OsFileSystem, &TarGzExtractor, &SystemClock, &paths)
            .with_stage_callback(&record)
            .install_new(FILENAME, &checksum, "go1.21.0")
            .await;

        assert!(matches!(result, Err(VswitchError::Download { .. })));
        assert_eq!(*stages.lock().expect("lock"), vec![InstallStage::Downloading]);
        assert_eq!(
            std::fs::read(paths.staging_file()).expect("Should keep partial file"),
            partial
        );
        assert!(!paths.version_dir("go1.21.0").exists());
        assert!(!paths.versions.join("go").exists());
        assert_eq!(paths.active_version(&OsFileSystem), None);
    }

    #[tokio::test]
    async fn unreadable_staging_file_fails_checksum_and_is_removed() {
        let temp = TempDir::new().expect("Should create temp dir");
        let paths = setup(temp.path());
        let (bytes, checksum) = release();
        let source = FakeSource::default().with_artifact(FILENAME, bytes);
        let fs = FaultyFileSystem::new();
        fs.fail_open_of(paths.staging_file());

        let result = Installer::new(&source, &fs, &TarGzExtractor, &SystemClock, &paths)
            .install_new(FILENAME, &checksum, "go1.21.0")
            .await;

        match result {
            Err(VswitchError::Checksum { path, .. }) => assert_eq!(path, paths.staging_file()),
            other => panic!("Expected Checksum error, got {other:?}"),
        }
        assert!(!paths.staging_file().exists());
        assert!(!paths.version_dir("go1.21.0").exists());
        assert_eq!(paths.active_version(&OsFileSystem), None);
    }

    /// Extracts like [`TarGzExtractor`] but reports no top-level names.
    struct SilentExtractor;

    impl Extractor for SilentExtractor {
        fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<Vec<String>> {
            TarGzExtractor.extract(archive_path, dest_dir)?;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn relocation_falls_back_to_newest_directory() {
        let temp = TempDir::new().expect("Should create temp dir");
        let paths = setup(temp.path());
        let (bytes, checksum) = release();
        let source = FakeSource::default().with_artifact(FILENAME, bytes);

        Installer::new(&source, &OsFileSystem, &SilentExtractor, &SystemClock, &paths)
            .install_new(FILENAME, &checksum, "go1.21.0")
            .await
            .expect("Should install");

        assert!(paths.version_dir("go1.21.0").join("bin/go").is_file());
        assert!(!paths.versions.join("go").exists());
    }

    #[test]
    fn activate_existing_replaces_links_and_marker() {
        let temp = TempDir::new().expect("Should create temp dir");
        let paths = setup(temp.path());
        for version in ["go1.20.5", "go1.21.0"] {
            let bin = paths.version_bin_dir(version);
            std::fs::create_dir_all(&bin).expect("Should create bin");
            std::fs::write(bin.join("go"), version).expect("Should write binary");
        }
        let source = FakeSource::default();
        let installer = Installer::new(&source, &OsFileSystem, &TarGzExtractor, &SystemClock, &paths);

        installer.activate_existing("go1.20.5").expect("Should activate");
        installer.activate_existing("go1.21.0").expect("Should switch");

        assert_eq!(
            std::fs::read_to_string(paths.bin.join("go")).expect("Should follow link"),
            "go1.21.0"
        );
        assert_eq!(
            std::fs::read_to_string(paths.marker_file()).expect("Should read marker"),
            "go1.21.0"
        );
        assert_eq!(source.downloads(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn activate_existing_replaces_dangling_links() {
        let temp = TempDir::new().expect("Should create temp dir");
        let paths = setup(temp.path());
        let bin = paths.version_bin_dir("go1.21.0");
        std::fs::create_dir_all(&bin).expect("Should create bin");
        std::fs::write(bin.join("go"), "new").expect("Should write binary");
        OsFileSystem
            .symlink(&temp.path().join("gone"), &paths.bin.join("go"))
            .expect("Should create dangling link");
        let source = FakeSource::default();

        Installer::new(&source, &OsFileSystem, &TarGzExtractor, &SystemClock, &paths)
            .activate_existing("go1.21.0")
            .expect("Should activate");

        assert_eq!(
            std::fs::read_to_string(paths.bin.join("go")).expect("Should follow link"),
            "new"
        );
    }

    #[test]
    fn activate_existing_fails_without_bin_directory() {
        let temp = TempDir::new().expect("Should create temp dir");
        let paths = setup(temp.path());
        let source = FakeSource::default();

        let result = Installer::new(&source, &OsFileSystem, &TarGzExtractor, &SystemClock, &paths)
            .activate_existing("go1.21.0");

        assert!(matches!(result, Err(VswitchError::Symlink { .. })));
        assert_eq!(paths.active_version(&OsFileSystem), None);
    }

    fn dir(name: &str, secs: u64) -> DirEntryInfo {
        DirEntryInfo {
            name: name.to_string(),
            path: PathBuf::from(name),
            is_dir: true,
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
        }
    }

    #[test]
    fn newest_directory_prefers_latest_modification() {
        let dirs = vec![dir("go1.20.5", 10), dir("go", 30), dir("go1.21.0", 20)];
        let newest = newest_directory(&SystemClock, &dirs).expect("Should pick one");
        assert_eq!(newest.name, "go");
    }

    #[test]
    fn newest_directory_breaks_ties_by_first_seen() {
        let dirs = vec![dir("a", 10), dir("b", 30), dir("c", 30)];
        let newest = newest_directory(&SystemClock, &dirs).expect("Should pick one");
        assert_eq!(newest.name, "b");
    }

    #[test]
    fn newest_directory_is_none_for_empty_input() {
        assert!(newest_directory(&SystemClock, &[]).is_none());
    }

    #[test]
    fn stage_display_names() {
        assert_eq!(InstallStage::ChecksumVerifying.to_string(), "verifying checksum");
        assert_eq!(InstallStage::Done.to_string(), "done");
    }
}
