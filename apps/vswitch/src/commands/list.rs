//! Default command: shows the versions a user can pick from.
//!
//! ```text
//! Select a version:
//!
//!   1.21.3 - current version
//!   1.21.0 - already downloaded
//!   1.20.10
//!
//! Run 'vswitch install <version>' to switch.
//! ```

use anyhow::Result;

use crate::toolchain::VersionManager;

/// Executes the default listing.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub async fn execute(manager: &VersionManager, refresh: bool) -> Result<()> {
    let resolved = manager.get_versions(refresh).await?;
    let selectable = manager.filter_for_display(&resolved, false);

    if selectable.is_empty() {
        println!("No stable versions available.");
        return Ok(());
    }

    println!("Select a version:");
    println!();
    for version in selectable {
        println!("  {}", version.label(false));
    }
    println!();
    println!("Run 'vswitch install <version>' to switch.");

    Ok(())
}
