use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use morphogen::simulation::body::NodeRole;
use morphogen::simulation::brain::Brain;
use morphogen::simulation::evolution::Evolution;
use morphogen::simulation::organism::Organism;
use morphogen::simulation::params::Params;

#[derive(Parser)]
#[command(name = "morphogen")]
#[command(about = "Grow and evolve rule-grown organisms headlessly", long_about = None)]
struct Cli {
    /// JSON parameter file; defaults are used for missing fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of generations to run
    #[arg(short, long, default_value_t = 30)]
    generations: u32,

    /// Override the random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the final population to this JSON file
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut params = match &cli.config {
        Some(path) => Params::load_from_file(path)
            .with_context(|| format!("reading parameters from {}", path.display()))?,
        None => Params::default(),
    };
    if let Some(seed) = cli.seed {
        params.seed = seed;
    }

    info!(
        population = params.population_size,
        generations = cli.generations,
        seed = params.seed,
        "Starting morphogen run"
    );

    let mut evolution = Evolution::new(params)?;
    for _ in 0..cli.generations {
        evolution.run_generation(reach_fitness)?;
    }

    if let Some(best) = evolution.stats().best_ever() {
        info!(
            best,
            improvement = evolution.stats().improvement(),
            "Run finished"
        );
    }

    if let Some(path) = &cli.save {
        evolution
            .population()
            .save_to_file(path)
            .with_context(|| format!("saving population to {}", path.display()))?;
        info!(path = %path.display(), "Saved population");
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Demo fitness: body reach, plus a bonus for every actuator that has a motor
/// and leftover energy.
fn reach_fitness(organism: &Organism, brain: &Brain) -> f32 {
    let driven = organism
        .body
        .nodes()
        .iter()
        .filter(|n| n.role == NodeRole::Actuator && brain.motor_for(n.id).is_some())
        .count();
    organism.body.reach() + 5.0 * driven as f32 + organism.energy()
}
