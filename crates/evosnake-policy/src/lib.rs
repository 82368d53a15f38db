//! Neural policy for the snake agent.
//!
//! This crate turns a set of evolved weights into behaviour. It knows nothing
//! about genetic algorithms; the `evosnake-training` crate only hands it
//! weight sets and reads back episode results.
//!
//! # Architecture
//!
//! ```text
//! WeightSet (one tensor per layer transition)
//!     ↓ owned by
//! Controller (tanh dense layers + argmax)
//!     ↓ queried every step by
//! Episode (bounded by max_steps)
//!     ↓ drives
//! Environment (e.g. the snake game)
//! ```
//!
//! - [`weights`] - [`WeightSet`](weights::WeightSet), its [`LayerSchedule`](weights::LayerSchedule)
//!   and the flat [`Genome`](weights::Genome) encoding used by crossover
//! - [`controller`] - the deterministic forward pass
//! - [`environment`] - the contract an environment has to fulfil
//! - [`episode`] - running one episode, step by step or to completion
//! - [`replay`] - replaying a stored individual
//! - [`snake`] - [`Environment`](environment::Environment) adapter for the snake game
//!
//! # Example
//!
//! ```
//! use evosnake_engine::SnakeGame;
//! use evosnake_policy::{episode, weights::{LayerSchedule, WeightSampler}};
//!
//! let schedule = LayerSchedule::new(vec![5, 8, 4]).unwrap();
//! let sampler = WeightSampler::new(3.0).unwrap();
//! let weights = sampler.random_weights(&schedule, &mut rand::rng());
//!
//! let mut game = SnakeGame::new(10);
//! let individual = episode::run_episode(weights, &mut game, 300).unwrap();
//! assert!(individual.steps <= 300);
//! ```

pub mod controller;
pub mod environment;
pub mod episode;
pub mod replay;
pub mod snake;
pub mod weights;
