//! Per-dependency report entries

use super::upgrade_type::{normalize_version, UpgradeType};
use serde::Serialize;
use std::fmt;

/// A dependency as reported by a plugin, before classification
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawDependency {
    /// Package name
    pub name: String,
    /// Installed version, if any
    pub version: Option<String>,
    /// Highest version satisfying the declared constraint
    pub wanted_version: Option<String>,
    /// Highest published version
    pub latest_version: Option<String>,
}

impl RawDependency {
    /// Creates a new raw dependency with no versions
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the installed version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the wanted version
    pub fn with_wanted(mut self, version: impl Into<String>) -> Self {
        self.wanted_version = Some(version.into());
        self
    }

    /// Set the latest version
    pub fn with_latest(mut self, version: impl Into<String>) -> Self {
        self.latest_version = Some(version.into());
        self
    }

    /// Classify into a report entry
    pub fn classify(self) -> PackageInformation {
        PackageInformation::new(
            self.name,
            self.version.as_deref(),
            self.wanted_version.as_deref(),
            self.latest_version.as_deref(),
        )
    }
}

/// Report entry for one dependency.
///
/// Fields are read-only so `upgrade_type` always matches the versions it was
/// derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInformation {
    name: String,
    version: String,
    wanted_version: String,
    latest_version: String,
    upgrade_type: UpgradeType,
}

impl PackageInformation {
    /// Creates a new entry; missing or invalid versions become `unknown`
    pub fn new(
        name: impl Into<String>,
        version: Option<&str>,
        wanted_version: Option<&str>,
        latest_version: Option<&str>,
    ) -> Self {
        let version = normalize_version(version);
        let wanted_version = normalize_version(wanted_version);
        let latest_version = normalize_version(latest_version);
        let upgrade_type = UpgradeType::between(&version, &latest_version);

        Self {
            name: name.into(),
            version,
            wanted_version,
            latest_version,
            upgrade_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installed version or `unknown`
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn wanted_version(&self) -> &str {
        &self.wanted_version
    }

    pub fn latest_version(&self) -> &str {
        &self.latest_version
    }

    /// Change needed to reach the latest version
    pub fn upgrade_type(&self) -> UpgradeType {
        self.upgrade_type
    }

    /// Change needed to reach the wanted version
    pub fn wanted_upgrade_type(&self) -> UpgradeType {
        UpgradeType::between(&self.version, &self.wanted_version)
    }
}

impl fmt::Display for PackageInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (wanted {}, latest {}) [{}]",
            self.name, self.version, self.wanted_version, self.latest_version, self.upgrade_type
        )
    }
}
