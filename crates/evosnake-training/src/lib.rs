//! Evolving controller weights with a genetic algorithm.
//!
//! This crate implements the training loop that searches for good
//! [`WeightSet`](evosnake_policy::weights::WeightSet)s without any gradient
//! information. The only feedback is the score and survival time an individual
//! reaches in an episode.
//!
//! # How Training Works
//!
//! 1. **Population** - Spawn `population_size` random weight sets
//! 2. **Evaluation** - Every individual plays one episode in its own environment, in parallel
//! 3. **Fitness** - `fitness = score_weight * score + steps_weight * steps`
//! 4. **Selection** - Keep the top `elite_count` individuals (truncation selection)
//! 5. **Reproduction** - Every pair of elites produces one child by uniform crossover and mutation
//! 6. **Refill** - Pad with fresh random weight sets up to `population_size`
//! 7. **Repeat** - For `generations` generations, checkpointing periodically
//!
//! # Architecture
//!
//! ```text
//! EvolutionController (INIT → EVALUATING ⇄ EVOLVING → DONE)
//!     ↓ fans out through
//! ParallelMap (bounded worker pool)
//!     ↓ runs
//! evosnake_policy::episode::run_episode
//!     ↓ results ranked and recombined by
//! PopulationEvolver (genetic operators)
//!     ↓ best individuals persisted through
//! CheckpointStore / ProgressLog
//! ```
//!
//! # Modules
//!
//! - [`config`] - the immutable [`GaConfig`](config::GaConfig) threaded through everything
//! - [`operators`] - crossover, mutation and spawning on flat genomes
//! - [`genetic`] - ranking, selection and population reconstruction
//! - [`parallel`] - the parallel map used for fitness evaluation
//! - [`checkpoint`] - persistence interfaces
//! - [`evolution`] - the generational control loop
//!
//! # Current Limitations
//!
//! - **No convergence guarantee**: elites never get worse, but the population
//!   mean may fluctuate or stagnate
//! - **Single episode per individual**: a lucky food placement can promote a
//!   weak individual for one generation
//! - **Fixed parameters**: mutation rate and selection pressure do not adapt

pub mod checkpoint;
pub mod config;
pub mod evolution;
pub mod genetic;
pub mod operators;
pub mod parallel;
