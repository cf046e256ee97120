//! emf-compliance: CLI for EMF exposure compliance analysis

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use emf_compliance::{run, SimulationConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "emf-compliance")]
#[command(about = "EMF exposure assessment and compliance analysis for transmitter sites")]
#[command(version)]
struct Args {
    /// Simulation configuration file (YAML)
    config: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    // Exit codes: 0 all points compliant, 1 non-compliant points found,
    // 2 configuration or runtime error
    match execute(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: &Args) -> Result<bool> {
    let config = SimulationConfig::load(&args.config)
        .with_context(|| format!("failed to load configuration {:?}", args.config))?;
    config.validate()?;

    info!("simulation: {}", config.name);
    info!(
        "standard: {} ({})",
        config.compliance.standard, config.compliance.category
    );
    info!(
        "grid: {} to {} x {} to {} @ z={} m, resolution {} m",
        config.grid.x_min,
        config.grid.x_max,
        config.grid.y_min,
        config.grid.y_max,
        config.grid.z_level,
        config.grid.resolution
    );
    info!("antennas: {}", config.antennas.len());

    let outcome = run(&config, &args.output).context("simulation failed")?;

    info!("results written to {:?}", args.output);
    println!("{}", outcome.summary_text);

    Ok(outcome.summary.overall_compliant)
}
