//! CLI argument parsing module for dep-doctor

use crate::service::MergePolicy;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Parse a duration: plain seconds (`30`) or with a unit (`500ms`, `30s`, `2m`)
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let (num_str, unit) = if let Some(n) = s.strip_suffix("ms") {
        (n, "ms")
    } else if let Some(n) = s.strip_suffix('s') {
        (n, "s")
    } else if let Some(n) = s.strip_suffix('m') {
        (n, "m")
    } else {
        (s, "s")
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in duration: {}", num_str))?;

    if num == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(match unit {
        "ms" => Duration::from_millis(num),
        "m" => Duration::from_secs(
            num.checked_mul(60)
                .ok_or_else(|| format!("duration too large: {}", s))?,
        ),
        _ => Duration::from_secs(num),
    })
}

/// Parse a `KEY=VALUE` environment override
fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid environment override '{}': expected KEY=VALUE", s)),
    }
}

/// Dependency doctor: installed, wanted and latest versions per dependency
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dep-doctor",
    version,
    about = "Report installed, wanted and latest versions of project dependencies"
)]
pub struct CliArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Show only dependencies that need an upgrade
    #[arg(long)]
    pub outdated: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    // Engine options
    /// Timeout for each package manager command (e.g. 30, 30s, 2m)
    #[arg(long, value_parser = parse_duration, default_value = "60s")]
    pub timeout: Duration,

    /// Overall deadline for the whole analysis
    #[arg(long, value_parser = parse_duration)]
    pub deadline: Option<Duration>,

    /// Which plugin wins when two report the same dependency (first, last)
    #[arg(long, default_value = "first")]
    pub merge: MergePolicy,

    /// Use this package manager only, skipping marker detection (npm, pnpm, yarn)
    #[arg(long)]
    pub manager: Option<String>,

    /// Extra environment for package manager commands (can be specified multiple times)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair, action = ArgAction::Append)]
    pub env: Vec<(String, String)>,
}
