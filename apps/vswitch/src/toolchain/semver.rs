//! Partial version specifiers.
//!
//! Users may ask for `1`, `1.21`, `1.21.3` or `1.21rc2`. A [`Semver`] holds
//! whichever components were given and renders back to that canonical form,
//! which is then used as a prefix against catalog display names.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use super::resolver::ResolvedVersion;
use super::{Result, VswitchError};

static SEMVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)(?:\.(\d+))?(?:\.(\d+)|rc(\d+))?$").expect("semver pattern is valid")
});

/// A partial or full version specifier.
///
/// At most one of `patch` and `release_candidate` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Semver {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub release_candidate: Option<u64>,
}

impl Semver {
    /// Parses `major(.minor)?(.patch|rcN)?`.
    ///
    /// # Errors
    ///
    /// Returns [`VswitchError::InvalidVersionFormat`] if `raw` does not follow
    /// the grammar or a component does not fit in a `u64`.
    pub fn parse(raw: &str) -> Result<Self> {
        let input = raw.trim();
        let captures = SEMVER_RE
            .captures(input)
            .ok_or_else(|| VswitchError::invalid_version_format(raw))?;

        let number = |index: usize| -> Result<Option<u64>> {
            captures
                .get(index)
                .map(|m| {
                    m.as_str()
                        .parse::<u64>()
                        .map_err(|_| VswitchError::invalid_version_format(raw))
                })
                .transpose()
        };

        let major = number(1)?.ok_or_else(|| VswitchError::invalid_version_format(raw))?;

        Ok(Self {
            major,
            minor: number(2)?,
            patch: number(3)?,
            release_candidate: number(4)?,
        })
    }
}

impl fmt::Display for Semver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{minor}")?;
        }
        if let Some(patch) = self.patch {
            write!(f, ".{patch}")?;
        } else if let Some(rc) = self.release_candidate {
            write!(f, "rc{rc}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Semver {
    type Err = VswitchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Returns the first version, in catalog order, whose display name starts
/// with the rendered `pattern`.
///
/// The catalog is newest-first, so an underspecified pattern such as `1.21`
/// resolves to the newest matching release.
#[must_use]
pub fn find_match<'a>(resolved: &'a [ResolvedVersion], pattern: &Semver) -> Option<&'a ResolvedVersion> {
    let prefix = pattern.to_string();
    resolved
        .iter()
        .find(|version| version.display_name.starts_with(&prefix))
}
