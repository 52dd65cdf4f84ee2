//! JSON output formatter for machine processing
//!
//! Emits the merged package list as a pretty-printed array with camelCase
//! keys. Skipped plugins are reported on stderr, not here.

use crate::output::{visible_packages, OutputFormatter};
use crate::service::AnalysisReport;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Only emit packages with an available upgrade
    outdated_only: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(outdated_only: bool) -> Self {
        Self { outdated_only }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &AnalysisReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let packages = visible_packages(report, self.outdated_only);

        let json = serde_json::to_string_pretty(&packages).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawDependency;

    fn create_test_report() -> AnalysisReport {
        AnalysisReport {
            plugins: vec!["npm".to_string()],
            packages: vec![
                RawDependency::new("lodash")
                    .with_version("4.17.20")
                    .with_wanted("4.17.21")
                    .with_latest("5.0.0")
                    .classify(),
                RawDependency::new("express")
                    .with_version("4.18.2")
                    .with_wanted("4.18.2")
                    .with_latest("4.18.2")
                    .classify(),
            ],
            skipped: vec![],
        }
    }

    fn render(formatter: &JsonFormatter, report: &AnalysisReport) -> serde_json::Value {
        let mut output = Vec::new();
        formatter.format(report, &mut output).unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn test_format_json() {
        let parsed = render(&JsonFormatter::new(false), &create_test_report());

        let packages = parsed.as_array().unwrap();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0]["name"], "lodash");
        assert_eq!(packages[0]["version"], "4.17.20");
        assert_eq!(packages[0]["wantedVersion"], "4.17.21");
        assert_eq!(packages[0]["latestVersion"], "5.0.0");
        assert_eq!(packages[0]["upgradeType"], "major");
        assert_eq!(packages[1]["upgradeType"], "none");
    }

    #[test]
    fn test_format_json_outdated_only() {
        let parsed = render(&JsonFormatter::new(true), &create_test_report());

        let packages = parsed.as_array().unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0]["name"], "lodash");
    }

    #[test]
    fn test_format_json_empty_report() {
        let parsed = render(&JsonFormatter::new(false), &AnalysisReport::default());
        assert_eq!(parsed, serde_json::json!([]));
    }

    #[test]
    fn test_format_json_unknown_versions() {
        let report = AnalysisReport {
            plugins: vec!["yarn".to_string()],
            packages: vec![RawDependency::new("left-pad").classify()],
            skipped: vec![],
        };
        let parsed = render(&JsonFormatter::new(false), &report);

        assert_eq!(parsed[0]["version"], "unknown");
        assert_eq!(parsed[0]["latestVersion"], "unknown");
        assert_eq!(parsed[0]["upgradeType"], "unknown");
    }
}
