//! Command modules for the vswitch CLI.
//!
//! - [`list`] - Show selectable versions (no subcommand)
//! - [`versions`] - List available or installed versions
//! - [`install`] - Install and activate a version
//! - [`prune`] - Delete every version except the active one
//!
//! Every command receives the shared [`VersionManager`](crate::toolchain::VersionManager)
//! and the global `--refresh` flag.

pub mod install;
pub mod list;
pub mod prune;
pub mod versions;
