//! Core domain models for dep-doctor
//!
//! This module contains:
//! - Raw dependency tuples as reported by package manager plugins
//! - Classified report entries (`PackageInformation`)
//! - Upgrade classification and version parsing

mod package_information;
mod upgrade_type;

pub use package_information::{PackageInformation, RawDependency};
pub use upgrade_type::{normalize_version, parse_version, UpgradeType, UNKNOWN_VERSION};
