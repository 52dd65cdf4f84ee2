//! Upgrade classification between two versions
//!
//! Versions are compared with semver rules:
//! - Major: the leading component differs
//! - Minor: the second component differs, leading unchanged
//! - Patch: only the trailing component (or the pre-release tag) differs
//! - None: same precedence
//! - Unknown: either side is not a parseable version

use semver::Version;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Sentinel for a version that is missing or not a valid semantic version
pub const UNKNOWN_VERSION: &str = "unknown";

/// Size of the change needed to move between two versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeType {
    /// Breaking change
    Major,
    /// New features
    Minor,
    /// Fixes only
    Patch,
    /// Already there
    None,
    /// Cannot be compared
    Unknown,
}

impl UpgradeType {
    /// Classify the change from `from` to `to`
    pub fn between(from: &str, to: &str) -> Self {
        match (parse_version(from), parse_version(to)) {
            (Some(from), Some(to)) => Self::between_versions(&from, &to),
            _ => UpgradeType::Unknown,
        }
    }

    /// Classify the change between two parsed versions
    pub fn between_versions(from: &Version, to: &Version) -> Self {
        if from.cmp_precedence(to) == Ordering::Equal {
            UpgradeType::None
        } else if from.major != to.major {
            UpgradeType::Major
        } else if from.minor != to.minor {
            UpgradeType::Minor
        } else {
            UpgradeType::Patch
        }
    }

    /// Plain label
    pub fn label(&self) -> &'static str {
        match self {
            UpgradeType::Major => "major",
            UpgradeType::Minor => "minor",
            UpgradeType::Patch => "patch",
            UpgradeType::None => "none",
            UpgradeType::Unknown => "unknown",
        }
    }

    /// Whether any upgrade is needed
    pub fn is_upgrade(&self) -> bool {
        matches!(
            self,
            UpgradeType::Major | UpgradeType::Minor | UpgradeType::Patch
        )
    }
}

impl fmt::Display for UpgradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse a version string leniently: surrounding whitespace and a leading
/// `v` or `=` are ignored.
pub fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('='))
        .unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}

/// Normalize a reported version into either its canonical semver form or
/// [`UNKNOWN_VERSION`]
pub fn normalize_version(raw: Option<&str>) -> String {
    raw.and_then(parse_version)
        .map(|version| version.to_string())
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
}
