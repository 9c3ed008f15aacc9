//! Control Mirror CLI Application
//!
//! Runs the control-mirror engine against a simulated host described in a
//! TOML scenario file:
//! - Components and controls of the runtime object space
//! - Slot identifiers and engine settings
//! - A timed script of host events (value writes, trigger pulses, edits)
//! - Report of indicator states (TXT/JSON)

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod report;
mod runner;

/// Control Mirror - mirror external control states onto indicator slots
#[derive(Parser, Debug)]
#[command(name = "control-mirror")]
#[command(about = "Simulate control mirroring from a TOML scenario", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the scenario file (TOML)
    #[arg(value_name = "FILE")]
    scenario: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Txt)]
    format: Format,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Txt,
    Json,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Control Mirror CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using engine library v{}", control_mirror::VERSION);

    let scenario = config::load_scenario(&args.scenario)?;
    log::debug!(
        "Scenario loaded: {} components, {} slots, {} script steps",
        scenario.components.len(),
        scenario.slots.len(),
        scenario.script.len()
    );

    let samples = runner::run_scenario(&scenario)?;
    let report = report::Report::new(args.scenario.display().to_string(), samples);

    let rendered = match args.format {
        Format::Txt => report.to_txt(),
        Format::Json => report.to_json()?,
    };

    match &args.output {
        Some(path) => write_report(path, &rendered)?,
        None => print!("{}", rendered),
    }

    Ok(())
}

fn write_report(path: &Path, rendered: &str) -> Result<()> {
    fs::write(path, rendered).with_context(|| format!("Failed to write report: {:?}", path))?;
    log::info!("Report written to {:?}", path);
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
