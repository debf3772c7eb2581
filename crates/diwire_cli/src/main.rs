//! Command-line driver for one generation run.
//!
//! # Responsibility
//! - Feed a JSON-lines discovery event stream through the engine.
//! - Emit modules and the manifest to the configured output directory.
//! - Exit non-zero only for setup failures, or for any failure in `--strict`.

use anyhow::{Context, Result};
use clap::Parser;
use diwire_core::{
    core_version, init_logging, parse_event_lines, EmissionReport, EmissionStatus, EngineConfig,
    ModuleEngine,
};
use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "diwire", version, about = "Generate dependency-injection modules from discovery events")]
struct Cli {
    /// JSON-lines discovery events; `-` reads standard input.
    events: PathBuf,
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides `output_dir`.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Overrides `log_level`.
    #[arg(long)]
    log_level: Option<String>,
    /// Overrides `log_dir`; must be absolute.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Exit with failure if any module or manifest line was not written.
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(report) => {
            print_summary(&report);
            if cli.strict && !report.is_complete() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("diwire: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<EmissionReport> {
    let config = load_config(cli)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).context("failed to initialize logging")?;
    }
    info!(
        "event=cli_start module=cli status=ok version={} events={} output_dir={}",
        core_version(),
        cli.events.display(),
        config.output_dir.display()
    );

    let reader = open_events(cli)?;
    let batch = parse_event_lines(reader)
        .with_context(|| format!("failed to read events from `{}`", cli.events.display()))?;
    if batch.malformed_lines > 0 {
        eprintln!(
            "diwire: skipped {} malformed event line(s)",
            batch.malformed_lines
        );
    }

    let mut engine =
        ModuleEngine::from_config(&config).context("failed to prepare module renderer")?;
    for event in batch.events {
        engine.process(event);
    }
    Ok(engine.finalize())
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    config.validate()?;
    Ok(config)
}

fn open_events(cli: &Cli) -> Result<Box<dyn BufRead>> {
    if cli.events.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let file = File::open(&cli.events)
        .with_context(|| format!("failed to open events file `{}`", cli.events.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn print_summary(report: &EmissionReport) {
    for outcome in &report.modules {
        match &outcome.status {
            EmissionStatus::Written { bytes } => {
                println!("wrote {} ({bytes} bytes)", outcome.location.display())
            }
            EmissionStatus::RenderFailed(err) => {
                println!("FAILED {}: render: {err}", outcome.module)
            }
            EmissionStatus::WriteFailed(err) => {
                println!("FAILED {}: write: {err}", outcome.module)
            }
        }
    }
    for module in &report.unprepared {
        println!("FAILED {module}: output could not be prepared");
    }
    println!(
        "modules={} written={} failed={} manifest_lines={} manifest_complete={} ignored_events={}",
        report.modules.len(),
        report.written_count(),
        report.failure_count(),
        report.manifest.lines_written,
        report.manifest.complete,
        report.ignored_events
    );
}
