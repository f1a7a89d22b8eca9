//! Prune command: deletes every installed version except the active one.

use anyhow::Result;

use crate::toolchain::VersionManager;

/// Executes the prune command.
///
/// Versions deleted before a failure are still reported.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, no version is active,
/// or a version directory cannot be removed.
pub async fn execute(manager: &VersionManager, refresh: bool) -> Result<()> {
    let resolved = manager.get_versions(refresh).await?;

    match manager.delete_unused_versions(&resolved) {
        Ok(deleted) if deleted.is_empty() => {
            println!("Nothing to delete");
            Ok(())
        }
        Ok(deleted) => {
            for version in &deleted {
                println!("{version} is deleted.");
            }
            println!("All the unused versions are deleted!");
            Ok(())
        }
        Err(partial) => {
            for version in &partial.deleted {
                println!("{version} is deleted.");
            }
            Err(partial.into())
        }
    }
}
