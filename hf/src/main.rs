//! hf - htmlflat command-line entry point

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::info;

use htmlflat::cli::Cli;
use htmlflat::config::Config;
use htmlflat::{Diagnostics, EXIT_VALIDATION_FAILED, Flattener, Outcome};

// Logs go to stderr; stdout carries only the tool's own output
fn setup_logging(log_level: Option<&str>) -> Result<()> {
    let level = match log_level.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") => tracing::Level::INFO,
        Some("ERROR") => tracing::Level::ERROR,
        Some("WARN") | None => tracing::Level::WARN,
        Some(other) => return Err(eyre::eyre!("Unknown log level: {}", other)),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

// Printed regardless of log level
fn report_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        eprintln!("{} {}", "warning:".yellow(), diagnostic);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(starter = %config.starter.file_name, "htmlflat starting");

    let flattener = Flattener::new(config)?;
    let outcome = flattener
        .run(&cli.input, &cli.output, &cli.flatten_options())
        .wrap_err_with(|| format!("Failed to flatten {}", cli.input.display()))?;

    match outcome {
        Outcome::Written(flattened) => {
            report_diagnostics(&flattened.diagnostics);
            println!(
                "{} Wrote flattened HTML to {}",
                "✓".green(),
                cli.output.display().to_string().cyan()
            );
            if cli.list_assets {
                for asset in &flattened.asset_refs {
                    println!("{}", asset);
                }
            }
            Ok(())
        }
        Outcome::Rejected { report, flattened } => {
            report_diagnostics(&flattened.diagnostics);
            eprintln!("\n{}", report.render().red());
            std::process::exit(EXIT_VALIDATION_FAILED);
        }
    }
}
