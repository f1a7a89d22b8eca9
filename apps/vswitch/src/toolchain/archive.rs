//! Archive extraction for staged releases.
//!
//! Releases are gzip-compressed tarballs. Every entry is resolved against the
//! extraction root and rejected if it would land anywhere but strictly inside
//! it. Extraction stops at the first rejected entry; entries already written
//! stay on disk.

use std::fs::File;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::{Archive, EntryType};

use super::{Result, VswitchError};

/// Mode used for parent directories the archive does not list explicitly.
const IMPLICIT_DIR_MODE: u32 = 0o755;

/// Unpacks a staged archive into a destination directory.
pub trait Extractor: Send + Sync {
    /// Extracts `archive_path` into `dest_dir`.
    ///
    /// Returns the distinct top-level names the archive created, in the
    /// order they were first seen.
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<Vec<String>>;
}

/// [`Extractor`] for `.tar.gz` archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzExtractor;

impl Extractor for TarGzExtractor {
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<Vec<String>> {
        extract_tar_gz(archive_path, dest_dir)
    }
}

/// Extracts a tar.gz archive to the destination directory.
///
/// Directory entries are created with their own mode. Regular files are
/// streamed to disk with their own mode after force-creating the parent
/// directory. Other entry kinds (links, devices) are skipped.
///
/// # Errors
///
/// Returns [`VswitchError::PathTraversal`] for an entry that escapes
/// `dest_dir`, and [`VswitchError::Extraction`] if the archive is not a
/// readable gzip-compressed tar or an entry cannot be written.
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<Vec<String>> {
    let file = File::open(archive_path).map_err(|e| {
        VswitchError::extraction(format!("failed to open archive {}", archive_path.display()), e)
    })?;
    let mut archive = Archive::new(GzDecoder::new(file));

    let entries = archive.entries().map_err(|e| {
        VswitchError::extraction(
            format!("failed to read tar entries from {}", archive_path.display()),
            e,
        )
    })?;

    let mut top_level: Vec<String> = Vec::new();

    for entry in entries {
        let mut entry = entry.map_err(|e| {
            VswitchError::extraction(
                format!("failed to read tar entry from {}", archive_path.display()),
                e,
            )
        })?;

        let entry_path = entry
            .path()
            .map_err(|e| VswitchError::extraction("failed to read entry path", e))?
            .into_owned();

        let relative = contained_path(&entry_path).ok_or_else(|| VswitchError::PathTraversal {
            path: dest_dir.join(&entry_path),
        })?;
        let output_path = dest_dir.join(&relative);

        let mode = entry.header().mode().unwrap_or(IMPLICIT_DIR_MODE);
        let entry_type = entry.header().entry_type();

        match entry_type {
            EntryType::Directory => create_dir(&output_path, mode)?,
            EntryType::Regular | EntryType::Continuous => {
                if let Some(parent) = output_path.parent() {
                    create_dir(parent, IMPLICIT_DIR_MODE)?;
                }
                let mut out = create_file(&output_path, mode)?;
                std::io::copy(&mut entry, &mut out).map_err(|e| {
                    VswitchError::extraction(
                        format!("failed to extract {}", output_path.display()),
                        e,
                    )
                })?;
            }
            other => {
                tracing::debug!(path = %entry_path.display(), kind = ?other, "skipping archive entry");
                continue;
            }
        }

        if let Some(Component::Normal(first)) = relative.components().next() {
            let name = first.to_string_lossy().into_owned();
            if !top_level.contains(&name) {
                top_level.push(name);
            }
        }
    }

    Ok(top_level)
}

/// Lexically resolves an entry name relative to the extraction root.
///
/// Returns `None` if the name is absolute, climbs above the root with `..`,
/// or resolves to the root itself.
fn contained_path(entry_path: &Path) -> Option<PathBuf> {
    let mut resolved = PathBuf::new();
    for component in entry_path.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !resolved.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if resolved.as_os_str().is_empty() {
        None
    } else {
        Some(resolved)
    }
}

fn create_dir(path: &Path, mode: u32) -> Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder.create(path).map_err(|e| {
        VswitchError::extraction(format!("failed to create directory {}", path.display()), e)
    })
}

fn create_file(path: &Path, mode: u32) -> Result<File> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    options.open(path).map_err(|e| {
        VswitchError::extraction(format!("failed to create file {}", path.display()), e)
    })
}
