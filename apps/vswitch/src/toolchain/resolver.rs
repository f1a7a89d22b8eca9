//! Annotates catalog entries with local install state.
//!
//! A [`ResolvedVersion`] is rebuilt on every pass from the catalog plus the
//! filesystem; it is never persisted. A version counts as installed as soon
//! as its directory exists under the versions root, whatever the catalog says.

use super::catalog::CatalogEntry;
use super::fs::FileSystem;
use super::paths::Paths;

/// A catalog entry annotated with installed/active status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub entry: CatalogEntry,
    /// Version with the configured prefix stripped (e.g. `1.21.3`).
    pub display_name: String,
    /// A directory named after the version exists under the versions root.
    pub already_installed: bool,
    /// The version matches the persisted active-version marker.
    pub is_active: bool,
}

impl ResolvedVersion {
    /// Wraps `entry` with both status flags cleared.
    #[must_use]
    pub fn new(entry: CatalogEntry, prefix: &str) -> Self {
        Self {
            display_name: entry.display_name(prefix).to_string(),
            entry,
            already_installed: false,
            is_active: false,
        }
    }

    /// Raw catalog version, also used as the install directory name.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.entry.version
    }

    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.entry.stable
    }

    /// Returns the text shown for this version in listings.
    ///
    /// ```text
    /// 1.21.3 (stable) - current version
    /// 1.21.0 (stable) - already downloaded
    /// 1.21rc4 (unstable)
    /// ```
    ///
    /// The parenthesised stability is only included when `show_stability` is set.
    #[must_use]
    pub fn label(&self, show_stability: bool) -> String {
        let mut label = self.display_name.clone();

        if show_stability {
            let stability = if self.is_stable() { "stable" } else { "unstable" };
            label = format!("{label} ({stability})");
        }

        if self.already_installed && !self.is_active {
            label.push_str(" - already downloaded");
        }

        if self.is_active {
            label.push_str(" - current version");
        }

        label
    }
}

/// Annotates every entry with `already_installed` and `is_active`.
///
/// The active-version marker is read once for the whole pass.
#[must_use]
pub fn annotate(
    entries: Vec<CatalogEntry>,
    paths: &Paths,
    fs: &dyn FileSystem,
    prefix: &str,
) -> Vec<ResolvedVersion> {
    let active = paths.active_version(fs);

    entries
        .into_iter()
        .map(|entry| {
            let mut resolved = ResolvedVersion::new(entry, prefix);
            resolved.already_installed = fs.exists(&paths.version_dir(resolved.version()));
            resolved.is_active = active.as_deref() == Some(resolved.version());
            resolved
        })
        .collect()
}

/// Returns the first stable version in catalog order.
#[must_use]
pub fn select_latest_stable(resolved: &[ResolvedVersion]) -> Option<&ResolvedVersion> {
    resolved.iter().find(|version| version.is_stable())
}

/// Returns stable versions only, unless `include_unstable` is set.
#[must_use]
pub fn filter_for_display(
    resolved: &[ResolvedVersion],
    include_unstable: bool,
) -> Vec<&ResolvedVersion> {
    resolved
        .iter()
        .filter(|version| include_unstable || version.is_stable())
        .collect()
}

/// Returns the raw version names of installed versions, in catalog order.
#[must_use]
pub fn filter_installed(resolved: &[ResolvedVersion]) -> Vec<String> {
    resolved
        .iter()
        .filter(|version| version.already_installed)
        .map(|version| version.version().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::toolchain::fs::OsFileSystem;
    use assert_fs::TempDir;

    fn entry(version: &str, stable: bool) -> CatalogEntry {
        CatalogEntry {
            version: version.to_string(),
            stable,
            files: vec![],
        }
    }

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            entry("go1.22rc1", false),
            entry("go1.21.3", true),
            entry("go1.21.0", true),
            entry("go1.20.5", true),
        ]
    }

    #[test]
    fn annotate_reads_directories_and_marker() {
        let temp = TempDir::new().expect("Should create temp dir");
        let paths = Paths::from_config(&Config::with_root(temp.path()));
        paths
            .ensure_directories(&OsFileSystem)
            .expect("Should create directories");
        std::fs::create_dir(paths.version_dir("go1.21.3")).expect("Should create dir");
        std::fs::create_dir(paths.version_dir("go1.20.5")).expect("Should create dir");
        paths
            .set_active_version(&OsFileSystem, "go1.21.3")
            .expect("Should write marker");

        let resolved = annotate(catalog(), &paths, &OsFileSystem, "go");

        let flags: Vec<_> = resolved
            .iter()
            .map(|v| (v.display_name.as_str(), v.already_installed, v.is_active))
            .collect();
        assert_eq!(
            flags,
            vec![
                ("1.22rc1", false, false),
                ("1.21.3", true, true),
                ("1.21.0", false, false),
                ("1.20.5", true, false),
            ]
        );
    }

    #[test]
    fn annotate_without_marker_marks_nothing_active() {
        let temp = TempDir::new().expect("Should create temp dir");
        let paths = Paths::from_config(&Config::with_root(temp.path()));

        let resolved = annotate(catalog(), &paths, &OsFileSystem, "go");

        assert!(resolved.iter().all(|v| !v.is_active && !v.already_installed));
    }

    #[test]
    fn select_latest_stable_skips_unstable() {
        let resolved: Vec<_> = catalog()
            .into_iter()
            .map(|e| ResolvedVersion::new(e, "go"))
            .collect();

        let latest = select_latest_stable(&resolved).expect("Should find stable");
        assert_eq!(latest.version(), "go1.21.3");
    }

    #[test]
    fn select_latest_stable_is_none_without_stable() {
        let resolved = vec![ResolvedVersion::new(entry("go1.22rc1", false), "go")];
        assert!(select_latest_stable(&resolved).is_none());
    }

    #[test]
    fn filter_for_display_hides_unstable_by_default() {
        let resolved: Vec<_> = catalog()
            .into_iter()
            .map(|e| ResolvedVersion::new(e, "go"))
            .collect();

        assert_eq!(filter_for_display(&resolved, false).len(), 3);
        assert_eq!(filter_for_display(&resolved, true).len(), 4);
    }

    #[test]
    fn filter_installed_keeps_catalog_order() {
        let mut resolved: Vec<_> = catalog()
            .into_iter()
            .map(|e| ResolvedVersion::new(e, "go"))
            .collect();
        resolved[3].already_installed = true;
        resolved[1].already_installed = true;

        assert_eq!(filter_installed(&resolved), vec!["go1.21.3", "go1.20.5"]);
    }

    #[test]
    fn label_variants() {
        let mut active = ResolvedVersion::new(entry("go1.21.3", true), "go");
        active.already_installed = true;
        active.is_active = true;
        assert_eq!(active.label(true), "1.21.3 (stable) - current version");
        assert_eq!(active.label(false), "1.21.3 - current version");

        let mut downloaded = ResolvedVersion::new(entry("go1.21.0", true), "go");
        downloaded.already_installed = true;
        assert_eq!(downloaded.label(true), "1.21.0 (stable) - already downloaded");

        let candidate = ResolvedVersion::new(entry("go1.21rc4", false), "go");
        assert_eq!(candidate.label(true), "1.21rc4 (unstable)");
        assert_eq!(candidate.label(false), "1.21rc4");
    }
}
