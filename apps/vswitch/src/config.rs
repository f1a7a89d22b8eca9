//! Runtime configuration for vswitch.
//!
//! A [`Config`] is assembled once in `main` from three layers, highest
//! precedence first:
//!
//! 1. Environment variables (`VSWITCH_HOME`, `VSWITCH_DIST_SERVER`,
//!    `VSWITCH_CACHE_TTL_HOURS`). Empty or whitespace-only values are ignored.
//! 2. An optional `config.toml` inside the data root.
//! 3. Built-in defaults.
//!
//! The resulting value is passed explicitly to every component that needs it.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::toolchain::{Result, VswitchError};

/// Environment variable overriding the data root.
pub const HOME_ENV: &str = "VSWITCH_HOME";

/// Environment variable overriding the distribution server.
pub const DIST_SERVER_ENV: &str = "VSWITCH_DIST_SERVER";

/// Environment variable overriding the catalog cache lifetime.
pub const CACHE_TTL_ENV: &str = "VSWITCH_CACHE_TTL_HOURS";

/// Name of the optional configuration file inside the data root.
pub const CONFIG_FILE: &str = "config.toml";

const DEFAULT_DIST_SERVER: &str = "https://go.dev/dl";
const DEFAULT_CATALOG_QUERY: &str = "?mode=json&include=all";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_TTL_HOURS: u64 = 24 * 7;
const DEFAULT_VERSION_PREFIX: &str = "go";
const DEFAULT_ROOT_DIR: &str = ".vswitch";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Data root holding the cache, marker, versions and log file.
    pub root: PathBuf,
    /// Shared directory holding symlinks to the active version's executables.
    pub bin_dir: PathBuf,
    /// Base URL of the distribution server, without a trailing slash.
    pub dist_server: String,
    /// Appended to `dist_server` to build the catalog URL.
    pub catalog_query: String,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
    /// Catalog cache lifetime in hours.
    pub cache_ttl_hours: u64,
    /// Prefix stripped from catalog version strings for display and matching.
    pub version_prefix: String,
}

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    bin_dir: Option<PathBuf>,
    dist_server: Option<String>,
    catalog_query: Option<String>,
    request_timeout_secs: Option<u64>,
    cache_ttl_hours: Option<u64>,
    version_prefix: Option<String>,
}

impl Config {
    /// Loads configuration from the process environment and the config file.
    ///
    /// # Errors
    ///
    /// Returns [`VswitchError::Config`] if the home directory cannot be
    /// determined, the config file is not valid TOML, or an environment
    /// override has the wrong type.
    pub fn load() -> Result<Self> {
        let root = match env_value(HOME_ENV) {
            Some(home) => PathBuf::from(home),
            None => dirs::home_dir()
                .ok_or_else(|| {
                    VswitchError::config(format!(
                        "cannot determine home directory, set {HOME_ENV}"
                    ))
                })?
                .join(DEFAULT_ROOT_DIR),
        };

        let config_path = root.join(CONFIG_FILE);
        let file_contents = if config_path.is_file() {
            Some(std::fs::read_to_string(&config_path).map_err(|e| {
                VswitchError::io(format!("failed to read {}", config_path.display()), e)
            })?)
        } else {
            None
        };

        Self::from_sources(root, file_contents.as_deref(), env_value)
    }

    /// Builds a configuration from an explicit root, optional TOML text and
    /// an environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`VswitchError::Config`] on malformed TOML or a non-numeric
    /// cache TTL override.
    pub fn from_sources(
        root: PathBuf,
        file_contents: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let file: ConfigFile = match file_contents {
            Some(text) => toml::from_str(text).map_err(|e| {
                VswitchError::config(format!("invalid {CONFIG_FILE}: {e}"))
            })?,
            None => ConfigFile::default(),
        };

        let dist_server = env(DIST_SERVER_ENV)
            .or(file.dist_server)
            .unwrap_or_else(|| DEFAULT_DIST_SERVER.to_string());

        let cache_ttl_hours = match env(CACHE_TTL_ENV) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                VswitchError::config(format!("{CACHE_TTL_ENV} must be a whole number of hours, got {raw:?}"))
            })?,
            None => file.cache_ttl_hours.unwrap_or(DEFAULT_CACHE_TTL_HOURS),
        };

        Ok(Self {
            bin_dir: file.bin_dir.unwrap_or_else(|| root.join("bin")),
            dist_server: dist_server.trim().trim_end_matches('/').to_string(),
            catalog_query: file
                .catalog_query
                .unwrap_or_else(|| DEFAULT_CATALOG_QUERY.to_string()),
            request_timeout: Duration::from_secs(
                file.request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            cache_ttl_hours,
            version_prefix: file
                .version_prefix
                .unwrap_or_else(|| DEFAULT_VERSION_PREFIX.to_string()),
            root,
        })
    }

    /// Configuration with defaults rooted at `root`. Used by tests.
    #[cfg(test)]
    pub fn with_root(root: &std::path::Path) -> Self {
        Self::from_sources(root.to_path_buf(), None, |_| None)
            .expect("defaults should always be valid")
    }

    /// URL of the release catalog.
    #[must_use]
    pub fn catalog_url(&self) -> String {
        format!("{}/{}", self.dist_server, self.catalog_query)
    }
}

/// Reads an environment variable, treating empty or whitespace values as unset.
fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
