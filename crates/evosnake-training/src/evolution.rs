//! The generation loop.
//!
//! [`EvolutionController`] is a small state machine:
//!
//! ```text
//! Init ─▶ Evaluating(0) ─▶ Evolving(0) ─▶ Evaluating(1) ─▶ … ─▶ Evaluating(G-1) ─▶ Done
//! ```
//!
//! - **Init** builds `population_size` random weight sets.
//! - **Evaluating(g)** plays one episode per member through the injected
//!   [`ParallelMap`], ranks the results and writes the checkpoint and
//!   progress record if `g` is a multiple of `checkpoint_interval`. After the
//!   last generation the best individuals are also written to
//!   [`CheckpointSlot::Final`].
//! - **Evolving(g)** builds the population of generation `g + 1`.
//!
//! Evaluation is the only concurrent phase. Every worker gets its own copy of
//! a weight set and builds its own environment, so nothing is shared. Ranking
//! and reconstruction wait for the complete set of results.
//!
//! Any failing episode aborts the whole generation with
//! [`TrainingError::Evaluation`]; no fitness is made up for it.

use std::io;

use evosnake_policy::{
    environment::Environment,
    episode::{EpisodeError, Individual, run_episode},
    weights::ShapeError,
};
use rand::Rng;

use crate::{
    checkpoint::{CheckpointError, CheckpointSlot, CheckpointStore, ProgressLog, ProgressRecord},
    config::{ConfigError, GaConfig},
    genetic::{Population, PopulationEvolver, rank},
    parallel::ParallelMap,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum EvolutionState {
    Init,
    Evaluating { generation: usize },
    Evolving { generation: usize },
    Done,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("evaluation of individual #{index} in generation {generation} failed")]
    #[from(skip)]
    Evaluation {
        generation: usize,
        index: usize,
        source: EpisodeError,
    },
    #[display("failed to build the population of generation {generation}")]
    #[from(skip)]
    Reconstruction {
        generation: usize,
        source: ShapeError,
    },
    #[display("failed to write checkpoint")]
    Checkpoint(CheckpointError),
    #[display("failed to append progress of generation {generation}")]
    #[from(skip)]
    Progress { generation: usize, source: io::Error },
}

/// Drives a whole training run.
///
/// - `F` creates a fresh environment for every episode
/// - `M` evaluates the population
/// - `S` and `L` receive checkpoints and progress records
#[derive(Debug)]
pub struct EvolutionController<F, M, S, L, R> {
    config: GaConfig,
    evolver: PopulationEvolver,
    new_environment: F,
    evaluator: M,
    store: S,
    progress: L,
    rng: R,
    state: EvolutionState,
    population: Population,
    ranked: Vec<Individual>,
}

impl<F, E, M, S, L, R> EvolutionController<F, M, S, L, R>
where
    F: Fn() -> E + Sync,
    E: Environment,
    M: ParallelMap,
    S: CheckpointStore,
    L: ProgressLog,
    R: Rng,
{
    pub fn new(
        config: GaConfig,
        new_environment: F,
        evaluator: M,
        store: S,
        progress: L,
        rng: R,
    ) -> Result<Self, ConfigError> {
        let evolver = PopulationEvolver::from_config(&config)?;
        Ok(Self {
            config,
            evolver,
            new_environment,
            evaluator,
            store,
            progress,
            rng,
            state: EvolutionState::Init,
            population: Population::default(),
            ranked: vec![],
        })
    }

    /// Starts from `population` instead of a random one.
    ///
    /// The population must have exactly `population_size` members.
    pub fn with_population(mut self, population: Population) -> Result<Self, ConfigError> {
        if population.len() != self.config.population_size {
            return Err(ConfigError::PopulationSize {
                expected: self.config.population_size,
                actual: population.len(),
            });
        }
        self.population = population;
        self.state = EvolutionState::Evaluating { generation: 0 };
        Ok(self)
    }

    #[must_use]
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> EvolutionState {
        self.state
    }

    /// The population awaiting (or under) evaluation.
    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Results of the most recently evaluated generation, best first.
    #[must_use]
    pub fn ranked(&self) -> &[Individual] {
        &self.ranked
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn progress(&self) -> &L {
        &self.progress
    }

    /// Performs one state transition and returns the new state.
    pub fn step(&mut self) -> Result<EvolutionState, TrainingError> {
        self.state = match self.state {
            EvolutionState::Init => {
                self.population = self.evolver.initial_population(&mut self.rng);
                tracing::debug!(size = self.population.len(), "initial population created");
                EvolutionState::Evaluating { generation: 0 }
            }
            EvolutionState::Evaluating { generation } => {
                self.evaluate(generation)?;
                self.checkpoint(generation)?;
                if generation + 1 >= self.config.generations {
                    self.save(CheckpointSlot::Final)?;
                    EvolutionState::Done
                } else {
                    EvolutionState::Evolving { generation }
                }
            }
            EvolutionState::Evolving { generation } => {
                self.population = self
                    .evolver
                    .next_generation(&self.ranked, &mut self.rng)
                    .map_err(|source| TrainingError::Reconstruction {
                        generation: generation + 1,
                        source,
                    })?;
                EvolutionState::Evaluating {
                    generation: generation + 1,
                }
            }
            EvolutionState::Done => EvolutionState::Done,
        };
        Ok(self.state)
    }

    /// Steps until [`EvolutionState::Done`] and returns the final ranking.
    pub fn run(&mut self) -> Result<&[Individual], TrainingError> {
        while !self.state.is_done() {
            self.step()?;
        }
        Ok(&self.ranked)
    }

    fn evaluate(&mut self, generation: usize) -> Result<(), TrainingError> {
        let new_environment = &self.new_environment;
        let max_steps = self.config.max_steps;
        let results = self
            .evaluator
            .map(self.population.members().to_vec(), |weights| {
                let mut environment = new_environment();
                run_episode(weights, &mut environment, max_steps)
            });

        let mut individuals = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(individual) => individuals.push(individual),
                Err(source) => {
                    tracing::warn!(generation, index, error = %source, "evaluation failed");
                    return Err(TrainingError::Evaluation {
                        generation,
                        index,
                        source,
                    });
                }
            }
        }

        self.ranked = rank(individuals, self.evolver.fitness());
        self.log_summary(generation);
        Ok(())
    }

    #[expect(clippy::cast_precision_loss)]
    fn log_summary(&self, generation: usize) {
        let fitness = self.evolver.fitness();
        let Some(best) = self.ranked.first() else {
            return;
        };
        let total = self
            .ranked
            .iter()
            .map(|i| fitness.fitness(i.score, i.steps))
            .sum::<f64>();
        tracing::info!(
            generation,
            best_fitness = fitness.fitness(best.score, best.steps),
            mean_fitness = total / self.ranked.len() as f64,
            best_score = best.score,
            best_steps = best.steps,
            "generation evaluated"
        );
    }

    fn checkpoint(&mut self, generation: usize) -> Result<(), TrainingError> {
        if generation % self.config.checkpoint_interval != 0 {
            return Ok(());
        }
        self.save(CheckpointSlot::Generation(generation))?;
        let record = ProgressRecord::from_ranked(generation, &self.ranked, self.config.progress_top);
        self.progress
            .append(&record)
            .map_err(|source| TrainingError::Progress { generation, source })?;
        Ok(())
    }

    fn save(&mut self, slot: CheckpointSlot) -> Result<(), TrainingError> {
        let keep = self.config.checkpoint_keep.min(self.ranked.len());
        self.store.save(slot, &self.ranked[..keep])?;
        tracing::info!(%slot, entries = keep, "checkpoint saved");
        Ok(())
    }
}
