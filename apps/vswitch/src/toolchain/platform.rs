//! Host platform detection.
//!
//! Maps Rust's `std::env::consts` names to the OS and architecture names used
//! by the release catalog (`darwin`, `amd64`, `arm64`, ...).

use std::fmt;

/// An operating system and architecture pair as named by the release catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    /// Catalog OS name (e.g. `linux`, `darwin`, `windows`).
    pub os: String,
    /// Catalog architecture name (e.g. `amd64`, `arm64`, `386`).
    pub arch: String,
}

impl Platform {
    /// Detects the platform vswitch is running on.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_consts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Builds a platform from Rust target names, translating them to catalog names.
    ///
    /// Names without a known translation are passed through unchanged.
    #[must_use]
    pub fn from_consts(os: &str, arch: &str) -> Self {
        let os = match os {
            "macos" => "darwin",
            other => other,
        };
        let arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            "powerpc64" => "ppc64",
            other => other,
        };
        Self {
            os: os.to_string(),
            arch: arch.to_string(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}
