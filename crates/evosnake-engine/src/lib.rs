//! Snake game engine used as the training environment.
//!
//! The engine is deliberately free of any learning logic: it only knows how to
//! advance a [`SnakeGame`] by one [`Direction`] and how to describe the
//! surroundings of the snake's head as a sensor vector.
//!
//! - [`core`] - board geometry ([`Position`], [`Direction`], [`Cell`], [`Board`])
//! - [`engine`] - game rules ([`SnakeGame`], [`GameStats`], [`GameSeed`])
//!
//! # Example
//!
//! ```
//! use evosnake_engine::{Direction, SnakeGame, StepOutcome};
//!
//! let mut game = SnakeGame::new(10);
//! let outcome = game.step(Direction::Right);
//! assert!(matches!(outcome, StepOutcome::Ongoing | StepOutcome::Win));
//! assert_eq!(game.stats().steps(), 1);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown direction index {index}")]
pub struct UnknownDirectionError {
    pub index: usize,
}
