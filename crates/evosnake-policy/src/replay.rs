//! Replaying a stored individual against a fresh environment.
//!
//! [`replay`] only sets up the [`Episode`]; the caller decides how fast to
//! [`tick`](Episode::tick) it (e.g. on a UI timer) and how to show progress.

use crate::{
    controller::Controller,
    environment::Environment,
    episode::{Episode, Individual},
    weights::ShapeError,
};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ReplayError {
    #[display("individual #{index} not found ({len} stored)")]
    MissingIndividual { index: usize, len: usize },
    #[display("stored weights do not form a valid network")]
    Shape(ShapeError),
}

/// Prepares an episode in which individual `index` of `entries` plays `environment`.
pub fn replay<E>(
    entries: &[Individual],
    index: usize,
    environment: E,
    max_steps: usize,
) -> Result<Episode<E>, ReplayError>
where
    E: Environment,
{
    let individual = entries.get(index).ok_or(ReplayError::MissingIndividual {
        index,
        len: entries.len(),
    })?;
    let controller = Controller::new(individual.weights.clone()).map_err(ReplayError::Shape)?;
    Ok(Episode::new(controller, environment, max_steps))
}

#[cfg(test)]
mod tests {
    use evosnake_engine::{GameSeed, SnakeGame};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::{
        episode::{EpisodeTick, run_episode},
        weights::{LayerSchedule, WeightSampler},
    };

    fn entries() -> Vec<Individual> {
        let schedule = LayerSchedule::new(vec![5, 8, 4]).unwrap();
        let sampler = WeightSampler::new(3.0).unwrap();
        let mut rng = Pcg64::seed_from_u64(20);
        (0..3)
            .map(|score| Individual {
                weights: sampler.random_weights(&schedule, &mut rng),
                score,
                steps: 0,
            })
            .collect()
    }

    #[test]
    fn test_replay_matches_evaluation() {
        let entries = entries();
        let seed = GameSeed::from_bytes([9; 16]);

        let mut game = SnakeGame::with_seed(8, seed);
        let evaluated = run_episode(entries[1].weights.clone(), &mut game, 300).unwrap();

        let mut episode = replay(&entries, 1, SnakeGame::with_seed(8, seed), 300).unwrap();
        let outcome = loop {
            if let EpisodeTick::Finished(outcome) = episode.tick().unwrap() {
                break outcome;
            }
        };
        assert_eq!(outcome.score, evaluated.score);
        assert_eq!(outcome.steps, evaluated.steps);
        assert!(episode.controller_calls() <= 300);
    }

    #[test]
    fn test_replay_missing_individual() {
        let entries = entries();
        let err = replay(&entries, 3, SnakeGame::new(8), 300).unwrap_err();
        assert_eq!(err, ReplayError::MissingIndividual { index: 3, len: 3 });
    }
}
