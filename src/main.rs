use anyhow::Result;
use cellpop_common::SimulationConfig;
use cellpop_engine::output::{save_final_population, save_snapshots};
use cellpop_engine::{CancelToken, RunOutcome, Simulation};
use clap::Parser;
use log::{debug, info};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(version, about = "Monte Carlo simulation of a growing cell population")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Overrides the seed from the configuration
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory the output files are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("Starting cell population simulation...");
    let mut config = SimulationConfig::load(&args.config)?;
    info!("Configuration loaded from {}.", args.config.display());
    if let Some(seed) = args.seed {
        config.initial_conditions.seed = seed;
    }
    info!("Using seed {}.", config.initial_conditions.seed);

    let mut sim = Simulation::new(config)?;
    debug!("Simulation Parameters: {:#?}", sim.population().params().sim);

    let outcome = sim.run(&CancelToken::new())?;
    if outcome == RunOutcome::Cancelled {
        info!("Run stopped early; saving what was recorded.");
    }

    write_outputs(&sim, &args.output_dir)?;
    info!("Simulation Complete.");
    Ok(())
}

fn write_outputs(sim: &Simulation, dir: &Path) -> Result<()> {
    let output = &sim.config().output;
    if output.save_snapshots {
        save_snapshots(dir, output, sim.snapshots())?;
    } else {
        info!("Skipping saving snapshots as per config (save_snapshots is false).");
    }

    if output.save_final_population {
        let cells: Vec<_> = sim.population().iter().map(|(_, c)| c.record()).collect();
        save_final_population(dir, output, &cells)?;
    } else {
        info!("Skipping saving final population as per config.");
    }
    Ok(())
}
