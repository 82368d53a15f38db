//! Game rules and state management.
//!
//! - [`SnakeGame`] - a single game, advanced one move at a time
//! - [`GameStats`] - score and survival counters of a game
//! - [`GameSeed`] - seed for deterministic food placement

pub use self::{game_seed::*, game_stats::*, snake_game::*};

mod game_seed;
mod game_stats;
mod snake_game;
