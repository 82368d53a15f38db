//! Training configuration.
//!
//! All tunable parameters of a run live in one immutable [`GaConfig`] value
//! that is validated once and then passed down explicitly. Nothing reads
//! parameters from global state.
//!
//! The defaults are:
//!
//! | parameter | default |
//! |---|---|
//! | `layers` | `[5, 8, 4]` |
//! | `population_size` | 300 |
//! | `elite_count` | 10 |
//! | `mutation_rate` | 0.001 |
//! | `weight_spread` | 3.0 |
//! | `max_steps` | 300 |
//! | `generations` | 10000 |
//! | `checkpoint_interval` | 100 |
//! | `checkpoint_keep` | 1 |
//! | `progress_top` | 4 |
//! | `fitness` | `20 * score + 1 * steps` |
//! | `workers` | 3 |

use evosnake_policy::weights::{InvalidSpreadError, LayerSchedule, WeightSampler};
use serde::{Deserialize, Serialize};

/// Weights of the linear fitness function `score_weight * score + steps_weight * steps`.
///
/// Score rewards task success; steps act as a tie-breaker that favours survival.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessWeights {
    pub score_weight: f64,
    pub steps_weight: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            score_weight: 20.0,
            steps_weight: 1.0,
        }
    }
}

impl FitnessWeights {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fitness(&self, score: usize, steps: usize) -> f64 {
        self.score_weight * score as f64 + self.steps_weight * steps as f64
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be positive")]
    EmptyPopulation,
    #[display("elite count must be positive")]
    NoElites,
    #[display(
        "{elite_count} elites and their {offspring_count} offspring exceed the population size {population_size}"
    )]
    Overfull {
        elite_count: usize,
        offspring_count: usize,
        population_size: usize,
    },
    #[display("mutation rate must be within [0, 1], got {rate}")]
    MutationRate { rate: f64 },
    #[display("invalid weight spread")]
    Spread(InvalidSpreadError),
    #[display("generation count must be positive")]
    NoGenerations,
    #[display("checkpoint interval must be positive")]
    NoCheckpointInterval,
    #[display("checkpoints must keep at least one individual")]
    NoCheckpointEntries,
    #[display("progress records must list at least one individual")]
    NoProgressEntries,
    #[display("worker count must be positive")]
    NoWorkers,
    #[display("initial population has {actual} members, expected {expected}")]
    PopulationSize { expected: usize, actual: usize },
}

/// Parameters of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GaConfig {
    /// Layer sizes of the controller network.
    pub layers: LayerSchedule,
    /// Number of individuals per generation.
    pub population_size: usize,
    /// Number of top individuals kept unchanged (and used as parents).
    pub elite_count: usize,
    /// Per-gene probability of replacing a gene with a fresh random value.
    pub mutation_rate: f64,
    /// Weights are drawn uniformly from `[-weight_spread, weight_spread]`.
    pub weight_spread: f64,
    /// Step budget of a single episode.
    pub max_steps: usize,
    pub generations: usize,
    /// Checkpoint every `checkpoint_interval` generations.
    pub checkpoint_interval: usize,
    /// Number of best individuals written per checkpoint.
    pub checkpoint_keep: usize,
    /// Number of best individuals listed in the progress log.
    pub progress_top: usize,
    pub fitness: FitnessWeights,
    /// Size of the evaluation worker pool.
    pub workers: usize,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            layers: LayerSchedule::new(vec![5, 8, 4]).expect("default layer schedule is valid"),
            population_size: 300,
            elite_count: 10,
            mutation_rate: 0.001,
            weight_spread: 3.0,
            max_steps: 300,
            generations: 10_000,
            checkpoint_interval: 100,
            checkpoint_keep: 1,
            progress_top: 4,
            fitness: FitnessWeights::default(),
            workers: 3,
        }
    }
}

/// Number of children produced by `elite_count` parents: one per unordered pair.
#[must_use]
pub const fn offspring_count(elite_count: usize) -> usize {
    elite_count * elite_count.saturating_sub(1) / 2
}

impl GaConfig {
    /// Checks every parameter.
    ///
    /// A valid configuration guarantees that elites plus offspring never exceed
    /// the population size, so every generation can be filled to exactly
    /// `population_size`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.elite_count == 0 {
            return Err(ConfigError::NoElites);
        }
        let offspring_count = offspring_count(self.elite_count);
        if self.elite_count + offspring_count > self.population_size {
            return Err(ConfigError::Overfull {
                elite_count: self.elite_count,
                offspring_count,
                population_size: self.population_size,
            });
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRate {
                rate: self.mutation_rate,
            });
        }
        self.weight_sampler()?;
        if self.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if self.checkpoint_interval == 0 {
            return Err(ConfigError::NoCheckpointInterval);
        }
        if self.checkpoint_keep == 0 {
            return Err(ConfigError::NoCheckpointEntries);
        }
        if self.progress_top == 0 {
            return Err(ConfigError::NoProgressEntries);
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }

    pub fn weight_sampler(&self) -> Result<WeightSampler, ConfigError> {
        WeightSampler::new(self.weight_spread).map_err(ConfigError::Spread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GaConfig::default();
        assert_eq!(config.validate(), Ok(()));
        // 10 elites + 45 offspring + 245 random
        assert_eq!(offspring_count(config.elite_count), 45);
    }

    #[test]
    fn test_fitness() {
        let fitness = FitnessWeights::default();
        assert_eq!(fitness.fitness(5, 3), 103.0);
        assert_eq!(fitness.fitness(1, 10), 30.0);
    }

    #[test]
    fn test_overfull_population_is_rejected() {
        let config = GaConfig {
            population_size: 54,
            ..GaConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Overfull {
                elite_count: 10,
                offspring_count: 45,
                population_size: 54,
            })
        );
        let config = GaConfig {
            population_size: 55,
            ..GaConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_invalid_parameters() {
        let base = GaConfig::default();
        let cases = [
            GaConfig {
                population_size: 0,
                ..base.clone()
            },
            GaConfig {
                elite_count: 0,
                ..base.clone()
            },
            GaConfig {
                mutation_rate: 1.5,
                ..base.clone()
            },
            GaConfig {
                weight_spread: -1.0,
                ..base.clone()
            },
            GaConfig {
                generations: 0,
                ..base.clone()
            },
            GaConfig {
                checkpoint_interval: 0,
                ..base.clone()
            },
            GaConfig {
                workers: 0,
                ..base.clone()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_empty_records_are_rejected() {
        let config = GaConfig {
            checkpoint_keep: 0,
            ..GaConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoCheckpointEntries));
        let config = GaConfig {
            progress_top: 0,
            ..GaConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoProgressEntries));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GaConfig =
            serde_json::from_str(r#"{ "population_size": 60, "layers": [5, 6, 4] }"#).unwrap();
        assert_eq!(config.population_size, 60);
        assert_eq!(config.layers.sizes(), &[5, 6, 4]);
        assert_eq!(config.elite_count, 10);
        assert!(serde_json::from_str::<GaConfig>(r#"{ "populaton_size": 60 }"#).is_err());
    }
}
