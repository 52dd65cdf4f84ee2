//! Text output formatter for human-readable display
//!
//! This module provides:
//! - An aligned table of current, wanted and latest versions
//! - Upgrade type indication with colors (major/minor/patch)
//! - Summary with a breakdown by upgrade type

use crate::domain::{PackageInformation, UpgradeType};
use crate::output::{visible_packages, OutputFormatter, Verbosity};
use crate::service::AnalysisReport;
use colored::Colorize;
use std::io::Write;

const HEADERS: [&str; 5] = ["Package", "Current", "Wanted", "Latest", "Upgrade"];

/// Get the display label for an upgrade type with color
fn colored_label(upgrade_type: UpgradeType, label: &str) -> String {
    match upgrade_type {
        UpgradeType::Major => label.red().bold().to_string(),
        UpgradeType::Minor => label.yellow().to_string(),
        UpgradeType::Patch => label.green().to_string(),
        UpgradeType::None => label.dimmed().to_string(),
        UpgradeType::Unknown => label.dimmed().to_string(),
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Only list packages with an available upgrade
    outdated_only: bool,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, outdated_only: bool) -> Self {
        Self {
            verbosity,
            outdated_only,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, outdated_only: bool, color: bool) -> Self {
        Self {
            verbosity,
            outdated_only,
            color,
        }
    }

    /// Column widths fitting the headers and every row
    fn column_widths(&self, packages: &[&PackageInformation]) -> [usize; 5] {
        let mut widths = HEADERS.map(str::len);
        for package in packages {
            let cells = [
                package.name(),
                package.version(),
                package.wanted_version(),
                package.latest_version(),
                package.upgrade_type().label(),
            ];
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.len());
            }
        }
        widths
    }

    fn format_header(&self, widths: &[usize; 5], writer: &mut dyn Write) -> std::io::Result<()> {
        let line = HEADERS
            .iter()
            .zip(widths)
            .map(|(h, w)| format!("{:width$}", h, width = *w))
            .collect::<Vec<_>>()
            .join("  ");
        let line = line.trim_end();

        if self.color {
            writeln!(writer, "{}", line.bold().underline())
        } else {
            writeln!(writer, "{}", line)
        }
    }

    /// Format a single package row
    fn format_row(
        &self,
        package: &PackageInformation,
        widths: &[usize; 5],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let upgrade_type = package.upgrade_type();
        let name = format!("{:width$}", package.name(), width = widths[0]);
        let current = format!("{:width$}", package.version(), width = widths[1]);
        let wanted = format!("{:width$}", package.wanted_version(), width = widths[2]);
        let latest = format!("{:width$}", package.latest_version(), width = widths[3]);
        let label = upgrade_type.label();

        if self.color {
            let wanted = if package.wanted_upgrade_type().is_upgrade() {
                wanted.bright_white().to_string()
            } else {
                wanted.dimmed().to_string()
            };
            let latest = if upgrade_type.is_upgrade() {
                latest.bright_white().bold().to_string()
            } else {
                latest.dimmed().to_string()
            };
            writeln!(
                writer,
                "{}  {}  {}  {}  {}",
                name,
                current,
                wanted,
                latest,
                colored_label(upgrade_type, label)
            )
        } else {
            writeln!(
                writer,
                "{}  {}  {}  {}  {}",
                name, current, wanted, latest, label
            )
        }
    }

    /// Count packages by upgrade type: (major, minor, patch, unknown)
    fn count_by_upgrade_type(&self, packages: &[&PackageInformation]) -> (usize, usize, usize, usize) {
        let mut major = 0;
        let mut minor = 0;
        let mut patch = 0;
        let mut unknown = 0;

        for package in packages {
            match package.upgrade_type() {
                UpgradeType::Major => major += 1,
                UpgradeType::Minor => minor += 1,
                UpgradeType::Patch => patch += 1,
                UpgradeType::Unknown => unknown += 1,
                UpgradeType::None => {}
            }
        }

        (major, minor, patch, unknown)
    }

    fn format_summary(
        &self,
        packages: &[&PackageInformation],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let (major, minor, patch, unknown) = self.count_by_upgrade_type(packages);
        let upgrades = major + minor + patch;

        if upgrades == 0 {
            return if self.color {
                writeln!(writer, "{}", "All dependencies are up to date".green())
            } else {
                writeln!(writer, "All dependencies are up to date")
            };
        }

        let mut parts = Vec::new();
        if self.color {
            if major > 0 {
                parts.push(format!("{} major", major.to_string().red()));
            }
            if minor > 0 {
                parts.push(format!("{} minor", minor.to_string().yellow()));
            }
            if patch > 0 {
                parts.push(format!("{} patch", patch.to_string().green()));
            }
        } else {
            if major > 0 {
                parts.push(format!("{} major", major));
            }
            if minor > 0 {
                parts.push(format!("{} minor", minor));
            }
            if patch > 0 {
                parts.push(format!("{} patch", patch));
            }
        }

        write!(
            writer,
            "{} package(s) can be upgraded ({})",
            upgrades,
            parts.join(", ")
        )?;
        if unknown > 0 {
            write!(writer, ", {} could not be compared", unknown)?;
        }
        writeln!(writer)
    }

    fn format_skipped(&self, report: &AnalysisReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if report.skipped.is_empty() {
            return Ok(());
        }

        writeln!(writer)?;
        if self.color {
            writeln!(writer, "{}:", "Skipped".yellow().bold())?;
        } else {
            writeln!(writer, "Skipped:")?;
        }
        for failure in &report.skipped {
            if self.color {
                writeln!(writer, "  {} {}", "✗".red(), failure)?;
            } else {
                writeln!(writer, "  - {}", failure)?;
            }
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &AnalysisReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if report.plugins.is_empty() {
            if self.verbosity != Verbosity::Quiet {
                writeln!(writer, "No supported package manager detected")?;
            }
            return Ok(());
        }

        if self.verbosity == Verbosity::Verbose {
            writeln!(writer, "Package managers: {}", report.plugins.join(", "))?;
            writeln!(writer)?;
        }

        let packages = visible_packages(report, self.outdated_only);

        if !packages.is_empty() {
            let widths = self.column_widths(&packages);
            if self.verbosity != Verbosity::Quiet {
                self.format_header(&widths, writer)?;
            }
            for package in &packages {
                self.format_row(package, &widths, writer)?;
            }
        }

        if self.verbosity != Verbosity::Quiet {
            if !packages.is_empty() {
                writeln!(writer)?;
            }
            self.format_summary(&packages, writer)?;
        }

        if self.verbosity == Verbosity::Verbose {
            self.format_skipped(report, writer)?;
        }

        Ok(())
    }
}
