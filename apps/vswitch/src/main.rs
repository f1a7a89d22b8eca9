#![warn(clippy::pedantic)]

//! # vswitch
//!
//! Installs toolchain releases from a distribution server and switches the
//! active one by re-pointing a shared directory of executable symlinks.
//!
//! ## Subcommands
//!
//! - (none) - List the stable versions you can switch to
//! - `versions` - List available or installed versions
//! - `install` - Install a version and make it active
//! - `prune` - Delete every installed version except the active one
//!
//! ## Examples
//!
//! Install the latest stable release:
//! ```bash
//! vswitch install
//! ```
//!
//! Switch to the newest 1.21 patch release, refreshing the catalog first:
//! ```bash
//! vswitch --refresh install 1.21
//! ```

mod commands;
mod config;
mod errors;
mod logging;
mod toolchain;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{install, list, prune, versions};
use config::Config;
use toolchain::VersionManager;

/// Toolchain version switcher.
#[derive(Parser)]
#[command(
    name = "vswitch",
    author,
    version,
    about = "Install and switch between toolchain versions",
    long_about = "vswitch downloads releases from a distribution server, verifies their \
    checksums, and switches the active version by re-pointing executable symlinks.",
    after_help = "\
ENVIRONMENT VARIABLES:
    VSWITCH_HOME              Data directory (default: ~/.vswitch)
    VSWITCH_DIST_SERVER       Distribution server URL (default: https://go.dev/dl)
    VSWITCH_CACHE_TTL_HOURS   Catalog cache lifetime in hours (default: 168)
    VSWITCH_LOG               Log file filter directives (default: info)"
)]
pub struct Cli {
    /// Re-fetch the release catalog even if the cached copy is still fresh.
    #[clap(long = "refresh", global = true, action = clap::ArgAction::SetTrue)]
    pub refresh: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the vswitch CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Install a version and make it active.
    ///
    /// Accepts a full or partial version ("1.21.3", "1.21", "1.22rc1") or
    /// "latest". A partial version resolves to the newest matching release.
    /// Versions already on disk are activated without downloading.
    Install(install::InstallArgs),

    /// List versions from the release catalog.
    ///
    /// Shows stable versions by default, marking the ones already downloaded
    /// and the current one.
    Versions(versions::VersionsArgs),

    /// Delete every installed version except the active one.
    Prune,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    let _log_guard = logging::init(&config.root)?;

    let manager = VersionManager::from_config(config)?;
    tracing::debug!(root = %manager.paths().root.display(), "data directories ready");

    match cli.command {
        Some(Commands::Install(args)) => install::execute(&manager, &args, cli.refresh).await,
        Some(Commands::Versions(args)) => versions::execute(&manager, &args, cli.refresh).await,
        Some(Commands::Prune) => prune::execute(&manager, cli.refresh).await,
        None => list::execute(&manager, cli.refresh).await,
    }
}
