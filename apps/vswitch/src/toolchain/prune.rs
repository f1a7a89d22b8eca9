//! Removes installed versions other than the active one.

use super::fs::FileSystem;
use super::paths::Paths;
use super::resolver::{ResolvedVersion, filter_installed};
use super::VswitchError;

/// A prune that stopped early. Versions in `deleted` stay deleted.
#[derive(Debug, thiserror::Error)]
#[error("pruning stopped after deleting {count} version(s)", count = .deleted.len())]
pub struct PartialPrune {
    pub deleted: Vec<String>,
    #[source]
    pub source: VswitchError,
}

/// Deletes every installed version except the active one, in catalog order.
///
/// Returns the raw names of the deleted versions.
///
/// # Errors
///
/// Fails with [`VswitchError::NoInstalledVersions`] when there is no active
/// version to keep, and with [`VswitchError::DeleteVersionFailed`] at the
/// first directory that cannot be removed. Either way the versions deleted so
/// far are carried in [`PartialPrune::deleted`].
pub fn delete_unused_versions(
    resolved: &[ResolvedVersion],
    paths: &Paths,
    fs: &dyn FileSystem,
) -> Result<Vec<String>, PartialPrune> {
    let mut deleted = Vec::new();

    let Some(active) = paths.active_version(fs) else {
        return Err(PartialPrune {
            deleted,
            source: VswitchError::NoInstalledVersions,
        });
    };

    for version in filter_installed(resolved) {
        if version == active {
            continue;
        }

        let dir = paths.version_dir(&version);
        if let Err(source) = fs.remove_dir_all(&dir) {
            tracing::warn!(%version, error = %source, "failed to delete version");
            return Err(PartialPrune {
                deleted,
                source: VswitchError::DeleteVersionFailed { version, source },
            });
        }

        tracing::info!(%version, "deleted unused version");
        deleted.push(version);
    }

    Ok(deleted)
}
