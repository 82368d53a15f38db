use std::path::PathBuf;

use anyhow::Context as _;
use evosnake_engine::SnakeGame;
use evosnake_policy::snake::{ACTION_COUNT, OBSERVATION_LEN};
use evosnake_training::{
    checkpoint::CheckpointSlot, config::GaConfig, evolution::EvolutionController,
    parallel::WorkerPool,
};
use rand::{SeedableRng as _, rngs::StdRng};

use crate::{
    store::{self, FileProgressLog, JsonCheckpointStore},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training configuration (JSON); missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of generations to run
    #[arg(long)]
    generations: Option<usize>,
    /// Number of individuals per generation
    #[arg(long)]
    population: Option<usize>,
    /// Number of elites kept per generation
    #[arg(long)]
    elites: Option<usize>,
    /// Number of evaluation worker threads
    #[arg(long)]
    workers: Option<usize>,
    /// Seed of the genetic algorithm's random number generator
    #[arg(long)]
    seed: Option<u64>,
    /// Width and height of the snake board
    #[arg(long, default_value_t = 10)]
    board_size: usize,
    /// Directory receiving checkpoints and the progress log
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

impl TrainArg {
    fn load_config(&self) -> anyhow::Result<GaConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file("training config", path)?,
            None => GaConfig::default(),
        };
        if let Some(generations) = self.generations {
            config.generations = generations;
        }
        if let Some(population) = self.population {
            config.population_size = population;
        }
        if let Some(elites) = self.elites {
            config.elite_count = elites;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        config
            .validate()
            .context("Invalid training configuration")?;
        Ok(config)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.load_config()?;
    let TrainArg {
        seed,
        board_size,
        output_dir,
        ..
    } = arg;
    let board_size = *board_size;

    anyhow::ensure!(board_size >= 2, "Board size must be at least 2, got {board_size}");
    anyhow::ensure!(
        config.layers.input_dim() == OBSERVATION_LEN && config.layers.output_dim() == ACTION_COUNT,
        "Layers {:?} do not fit the snake game ({OBSERVATION_LEN} inputs, {ACTION_COUNT} outputs)",
        config.layers.sizes()
    );

    store::ensure_dir(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;
    let pool = WorkerPool::new(config.workers).context("Failed to start worker pool")?;
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let checkpoints =
        JsonCheckpointStore::new(output_dir.clone(), config.layers.clone(), config.fitness);
    let progress = FileProgressLog::new(output_dir);

    tracing::info!(
        population = config.population_size,
        elites = config.elite_count,
        generations = config.generations,
        workers = pool.workers(),
        board_size,
        "training started"
    );

    let mut controller = EvolutionController::new(
        config,
        || SnakeGame::new(board_size),
        pool,
        checkpoints,
        progress,
        rng,
    )
    .context("Invalid training configuration")?;
    let ranked = controller.run().context("Training failed")?;

    eprintln!();
    eprintln!("Training completed");
    if let Some(best) = ranked.first() {
        eprintln!("  Best score: {} in {} steps", best.score, best.steps);
    }
    eprintln!(
        "  Final checkpoint: {}",
        store::checkpoint_path(output_dir, CheckpointSlot::Final).display()
    );
    eprintln!("  Progress log: {}", controller.progress().path().display());

    Ok(())
}
