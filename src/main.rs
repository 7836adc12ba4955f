/*
 * Herbivore Arena
 *
 * Herbivores wander a walled square arena looking for food. A hungry
 * herbivore heads for the food that is both close and close to its own
 * color, eats on contact, and every few meals spawns a child of a slightly
 * different color. Herbivores that go too long without food starve; food
 * shrinks as it is eaten and is replaced nearby once it runs out.
 *
 * Run with a window by default, or headless to get a summary on stdout.
 */

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use log::{info, warn};

use herbivores::{app, run_headless, SimulationParams, SimulationState};

#[derive(Parser)]
#[command(name = "herbivores")]
#[command(version)]
#[command(about = "Herbivores foraging colored food in a walled arena")]
struct Cli {
    /// Parameter file (YAML); missing keys keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Run without a window and print a summary
    #[arg(long)]
    headless: bool,

    /// Stop after this many ticks instead of the configured duration
    #[arg(short, long)]
    ticks: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let params = match &cli.config {
        Some(path) => {
            info!("Loading parameters from {}", path.display());
            SimulationParams::from_file(path)?
        }
        None => SimulationParams::default(),
    };

    let state = match cli.seed {
        Some(seed) => SimulationState::with_seed(params, seed)?,
        None => SimulationState::new(params)?,
    };
    info!("Seed: {}", state.seed());

    if cli.headless {
        let start = Instant::now();
        let (_, summary) = run_headless(state, cli.ticks)?;
        let secs = start.elapsed().as_secs_f64();

        println!("{}", summary);
        println!("Wall time: {:.2}s ({:.0} ticks/s)", secs, summary.ticks as f64 / secs.max(1e-9));
        return Ok(());
    }

    if cli.ticks.is_some() {
        warn!("--ticks only applies to headless runs");
    }
    app::run(state);
    Ok(())
}
