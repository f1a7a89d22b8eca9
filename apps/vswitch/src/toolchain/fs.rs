//! File-system capability used by the version pipeline.
//!
//! Every component that touches persisted local state goes through the
//! [`FileSystem`] trait so tests can inject failures (for example a directory
//! that refuses to be deleted) without relying on platform permission tricks.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A single entry returned by [`FileSystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    /// File name of the entry (not the full path).
    pub name: String,
    /// Full path of the entry.
    pub path: PathBuf,
    /// Whether the entry is a directory. Symlinks are not followed.
    pub is_dir: bool,
    /// Last modification time of the entry.
    pub modified: SystemTime,
}

/// Operations on persisted local state.
///
/// Methods mirror their `std::fs` counterparts and return plain
/// `std::io::Result` so callers can attach domain context.
pub trait FileSystem: Send + Sync {
    /// Returns `true` if anything (file, directory or symlink target) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a symlink, even a dangling one.
    fn is_symlink(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;

    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    /// Creates or truncates `path` and writes `contents` to it.
    fn write(&self, path: &Path, contents: &[u8]) -> std::io::Result<()>;

    /// Opens `path` for streaming reads.
    fn open(&self, path: &Path) -> std::io::Result<Box<dyn Read + Send>>;

    fn modified(&self, path: &Path) -> std::io::Result<SystemTime>;

    fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;

    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<DirEntryInfo>>;

    fn rename(&self, from: &Path, to: &Path) -> std::io::Result<()>;

    fn remove_file(&self, path: &Path) -> std::io::Result<()>;

    fn remove_dir_all(&self, path: &Path) -> std::io::Result<()>;

    /// Creates a symbolic link at `link` pointing to `original`.
    fn symlink(&self, original: &Path, link: &Path) -> std::io::Result<()>;

    /// Sets Unix permission bits on `path`. A no-op on other platforms.
    fn set_mode(&self, path: &Path, mode: u32) -> std::io::Result<()>;
}

/// [`FileSystem`] backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        // symlink_metadata succeeds for broken links where exists() does not.
        path.symlink_metadata()
            .is_ok_and(|meta| meta.file_type().is_symlink())
    }

    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        std::fs::write(path, contents)
    }

    fn open(&self, path: &Path) -> std::io::Result<Box<dyn Read + Send>> {
        let file = std::fs::File::open(path)?;
        Ok(Box::new(file))
    }

    fn modified(&self, path: &Path) -> std::io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }

    fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
                is_dir: entry.file_type()?.is_dir(),
                modified: metadata.modified()?,
            });
        }
        Ok(entries)
    }

    fn rename(&self, from: &Path, to: &Path) -> std::io::Result<()> {
        std::fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> std::io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> std::io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn symlink(&self, original: &Path, link: &Path) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(original, link)
        }

        #[cfg(windows)]
        {
            std::os::windows::fs::symlink_file(original, link)
                .or_else(|_| std::fs::hard_link(original, link))
        }
    }

    #[cfg(unix)]
    fn set_mode(&self, path: &Path, mode: u32) -> std::io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
    }

    #[cfg(not(unix))]
    fn set_mode(&self, _path: &Path, _mode: u32) -> std::io::Result<()> {
        Ok(())
    }
}
