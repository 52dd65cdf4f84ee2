//! dep-doctor - Dependency health reporting CLI tool
//!
//! Reports installed, wanted and latest versions for the dependencies of
//! npm, pnpm and yarn projects.

use anyhow::Context;
use clap::Parser;
use dep_doctor::assembly::{build_service, init_logging};
use dep_doctor::cli::CliArgs;
use dep_doctor::config::DoctorConfig;
use dep_doctor::output::{create_formatter, OutputConfig};
use dep_doctor::progress::Progress;
use std::io::{self, Write};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.debug);

    tracing::debug!("dep-doctor starting with args: {:?}", args);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("dep-doctor v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Target: {}", args.path.display());
    }

    if !args.path.is_dir() {
        anyhow::bail!("not a directory: {}", args.path.display());
    }

    let config = DoctorConfig::from_cli(&args);
    let service = build_service(&config);

    let mut progress = Progress::new(!args.quiet && !args.json);
    progress.spinner("Analyzing dependencies...");
    let report = service.report(&args.path, &config.request()).await;
    progress.finish_and_clear();

    let report = report.context("dependency analysis failed")?;

    // The verbose text report lists skipped plugins itself
    if args.json || !args.verbose {
        for failure in &report.skipped {
            eprintln!("warning: skipped {}", failure);
        }
    }

    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet, args.outdated);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    Ok(ExitCode::SUCCESS)
}
