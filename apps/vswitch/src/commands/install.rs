//! Install command for the vswitch CLI.
//!
//! Installs a version and makes it the active one. A version that is already
//! on disk is only re-linked.
//!
//! ## Usage
//!
//! ```bash
//! vswitch install            # Latest stable version
//! vswitch install 1.21       # Newest 1.21.x
//! vswitch install go1.21.3   # The configured prefix is optional
//! vswitch install 1.22rc1    # A release candidate
//! ```

use anyhow::Result;
use clap::Args;

use crate::toolchain::{
    InstallStage, Platform, ResolvedVersion, Semver, VersionManager, VswitchError,
};

/// Arguments for the install command.
#[derive(Args)]
pub struct InstallArgs {
    /// Version to install (e.g. "1.21", "1.21.3", "1.22rc1" or "latest").
    #[clap(default_value = "latest")]
    pub version: String,
}

/// Executes the install command.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the specifier does not
/// match a release, or any install stage fails.
pub async fn execute(manager: &VersionManager, args: &InstallArgs, refresh: bool) -> Result<()> {
    let platform = Platform::detect();
    let resolved = manager.get_versions(refresh).await?;
    let selected = select(manager, &resolved, &args.version)?;
    let name = selected.display_name.as_str();

    if selected.already_installed {
        println!("Switching to {name}...");
    } else {
        println!("Installing {name} for {platform}...");
    }

    let report = |stage: InstallStage| match stage {
        InstallStage::Downloading => println!("Downloading..."),
        InstallStage::ChecksumVerifying => println!("Verifying checksum..."),
        InstallStage::Extracting => println!("Extracting..."),
        InstallStage::Relocating | InstallStage::SymlinkSwitching | InstallStage::Done => {}
    };

    manager
        .install_with_progress(selected, &platform.os, &platform.arch, &report)
        .await?;

    println!("{name} version is installed!");
    Ok(())
}

/// Picks the release named by `specifier` from the newest-first catalog.
fn select<'a>(
    manager: &VersionManager,
    resolved: &'a [ResolvedVersion],
    specifier: &str,
) -> Result<&'a ResolvedVersion, VswitchError> {
    if specifier.trim().eq_ignore_ascii_case("latest") {
        return manager
            .get_latest_stable(resolved)
            .ok_or(VswitchError::NoStableVersion);
    }

    let pattern = parse_specifier(specifier, &manager.config().version_prefix)?;
    manager
        .find_version_by_semver(resolved, &pattern)
        .ok_or_else(|| VswitchError::no_matching_version(pattern.to_string()))
}

/// Parses a version specifier, accepting an optional leading `prefix`.
fn parse_specifier(specifier: &str, prefix: &str) -> Result<Semver, VswitchError> {
    let trimmed = specifier.trim();
    let bare = if prefix.is_empty() {
        trimmed
    } else {
        trimmed.strip_prefix(prefix).unwrap_or(trimmed)
    };
    Semver::parse(bare)
}
