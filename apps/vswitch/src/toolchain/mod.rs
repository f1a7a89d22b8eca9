//! Toolchain version management.
//!
//! This module holds everything below the command layer:
//!
//! - [`catalog`] / [`cache`] - the release catalog and its TTL-bounded local copy
//! - [`semver`] / [`resolver`] - matching specifiers and annotating releases with local state
//! - [`installer`] / [`archive`] / [`verify`] - the download, verify, extract and activate pipeline
//! - [`prune`] - removing versions other than the active one
//! - [`manager`] - [`VersionManager`], which wires the above over injected capabilities
//!
//! Side effects go through the [`client::ReleaseSource`], [`fs::FileSystem`],
//! [`clock::Clock`] and [`archive::Extractor`] traits so every stage can be
//! exercised against fakes.

pub mod archive;
pub mod cache;
pub mod catalog;
pub mod client;
pub mod clock;
pub mod fs;
pub mod installer;
pub mod manager;
pub mod paths;
pub mod platform;
pub mod prune;
pub mod resolver;
pub mod semver;
pub mod verify;

pub use crate::errors::VswitchError;
pub use installer::InstallStage;
pub use manager::VersionManager;
pub use platform::Platform;
pub use resolver::ResolvedVersion;
pub use semver::Semver;

/// Result type for toolchain operations.
pub type Result<T> = std::result::Result<T, VswitchError>;
