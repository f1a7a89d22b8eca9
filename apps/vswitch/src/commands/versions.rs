//! Versions command for the vswitch CLI.
//!
//! ## Usage
//!
//! ```bash
//! vswitch versions              # Stable versions from the catalog
//! vswitch versions --all        # Include release candidates and betas
//! vswitch versions --installed  # Only versions present on disk
//! vswitch versions --json       # Machine-readable output
//! ```

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::toolchain::{ResolvedVersion, VersionManager};

/// Arguments for the versions command.
#[derive(Args)]
pub struct VersionsArgs {
    /// Include unstable versions.
    #[clap(long, short = 'a')]
    pub all: bool,

    /// Show only installed versions.
    #[clap(long, short = 'i')]
    pub installed: bool,

    /// Show versions in JSON format.
    #[clap(long, short = 'j')]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct VersionInfo<'a> {
    version: &'a str,
    stable: bool,
    installed: bool,
    active: bool,
}

impl<'a> From<&'a ResolvedVersion> for VersionInfo<'a> {
    fn from(version: &'a ResolvedVersion) -> Self {
        Self {
            version: &version.display_name,
            stable: version.is_stable(),
            installed: version.already_installed,
            active: version.is_active,
        }
    }
}

/// Executes the versions command.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub async fn execute(manager: &VersionManager, args: &VersionsArgs, refresh: bool) -> Result<()> {
    let resolved = manager.get_versions(refresh).await?;

    let shown: Vec<&ResolvedVersion> = if args.installed {
        resolved.iter().filter(|v| v.already_installed).collect()
    } else {
        manager.filter_for_display(&resolved, args.all)
    };

    if args.json {
        let infos: Vec<VersionInfo> = shown.into_iter().map(VersionInfo::from).collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    if shown.is_empty() {
        if args.installed {
            println!("No versions installed.");
            println!();
            println!("Run 'vswitch install' to install the latest stable version.");
        } else {
            println!("No versions available.");
        }
        return Ok(());
    }

    println!(
        "{}",
        if args.installed {
            "Installed versions:"
        } else {
            "Available versions:"
        }
    );
    println!();
    for version in shown {
        println!("  {}", version.label(args.all));
    }

    Ok(())
}
