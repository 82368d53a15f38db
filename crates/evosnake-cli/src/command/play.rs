use std::{
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::Context as _;
use evosnake_engine::{GameSeed, SnakeGame};
use evosnake_policy::{
    episode::{EpisodeTermination, EpisodeTick},
    replay,
};
use evosnake_training::checkpoint::CheckpointSlot;

use crate::store;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Checkpoint file to load, or `latest` for the generation 0 checkpoint
    source: Option<String>,
    /// Index of the individual within the checkpoint (0 is the best)
    #[arg(long, default_value_t = 0)]
    individual: usize,
    /// Delay between two moves in milliseconds
    #[arg(long, default_value_t = 500)]
    tick_ms: u64,
    /// Stop the replay after this many moves
    #[arg(long, default_value_t = 10_000)]
    max_steps: usize,
    /// Width and height of the snake board
    #[arg(long, default_value_t = 10)]
    board_size: usize,
    /// Seed of the food placement (32 hex digits)
    #[arg(long)]
    seed: Option<GameSeed>,
}

/// Maps the positional source to a checkpoint file.
fn resolve_source(source: Option<&str>) -> PathBuf {
    match source {
        Some(source) if !source.eq_ignore_ascii_case("latest") => PathBuf::from(source),
        _ => store::checkpoint_path(Path::new("."), CheckpointSlot::Generation(0)),
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        source,
        individual,
        tick_ms,
        max_steps,
        board_size,
        seed,
    } = arg;
    anyhow::ensure!(*board_size >= 2, "Board size must be at least 2, got {board_size}");

    let path = resolve_source(source.as_deref());
    let entries = store::read_checkpoint(&path)
        .with_context(|| format!("Failed to load checkpoint file: {}", path.display()))?;
    tracing::info!(path = %path.display(), entries = entries.len(), "checkpoint loaded");

    let game = match seed {
        Some(seed) => SnakeGame::with_seed(*board_size, *seed),
        None => SnakeGame::new(*board_size),
    };
    let mut episode = replay::replay(&entries, *individual, game, *max_steps)
        .with_context(|| format!("Cannot replay individual #{individual}"))?;

    let tick = Duration::from_millis(*tick_ms);
    eprintln!("{}", episode.environment());
    let outcome = loop {
        thread::sleep(tick);
        let result = episode.tick().context("Replay failed")?;
        eprintln!("{}", episode.environment());
        if let EpisodeTick::Finished(outcome) = result {
            break outcome;
        }
    };

    println!(
        "Your highscore was {} in {} steps",
        outcome.score, outcome.steps
    );
    match outcome.termination {
        EpisodeTermination::Win | EpisodeTermination::Lose => {
            println!("You {}", outcome.termination);
        }
        EpisodeTermination::Truncated => {
            println!("Replay stopped after {max_steps} steps");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_source() {
        let latest = Path::new("./evo_snake-0.json");
        assert_eq!(resolve_source(None), latest);
        assert_eq!(resolve_source(Some("latest")), latest);
        assert_eq!(resolve_source(Some("LATEST")), latest);
        assert_eq!(
            resolve_source(Some("runs/evo_snake-final.json")),
            Path::new("runs/evo_snake-final.json")
        );
    }
}
