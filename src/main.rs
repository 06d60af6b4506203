//! Trains a 3-5-1 network to play a headless side-scroller.
//!
//! Usage: `neuroevo [params.json]`. Set `RUST_LOG=debug` for per-member output.

use std::path::Path;

use neuroevo::{Network, Params, Pool, Trainer};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod flappy;

const INPUTS: [&str; 3] = ["input1", "input2", "input3"];
const HIDDEN: [&str; 5] = ["hidden1", "hidden2", "hidden3", "hidden4", "hidden5"];
const OUTPUTS: [&str; 1] = ["output"];
const DUMP_PATH: &str = "best_chromosome.txt";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let params = match std::env::args().nth(1) {
        Some(path) => Params::load_from_file(&path)?,
        None => Params::default(),
    };
    params.validate()?;

    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let network = Network::layered(params.network, &INPUTS, &HIDDEN, &OUTPUTS, &mut rng)?;
    let pool = Pool::new(network.gen_chromosome(), params.pool, &mut rng)?;

    info!(
        population = pool.len(),
        connections = network.connection_count(),
        generations = params.trainer.generations,
        "starting neuroevolution"
    );

    let mut trainer = Trainer::new(network, pool, flappy::Flappy::new(), rng, params.trainer)?;
    let history = trainer.run()?;
    if let Some(best) = history.best_ever() {
        info!(
            generation = best.generation,
            fitness = best.best,
            "best generation"
        );
    }

    if let Some(chromosome) = trainer.best_chromosome() {
        // The dump appends, so start from an empty file.
        if Path::new(DUMP_PATH).exists() {
            std::fs::remove_file(DUMP_PATH)?;
        }
        chromosome.save_to_text_file(DUMP_PATH)?;
        info!(
            path = DUMP_PATH,
            fitness = trainer.best_fitness().unwrap_or_default(),
            "saved best chromosome"
        );
    }

    Ok(())
}
