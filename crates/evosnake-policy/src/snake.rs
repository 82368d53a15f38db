//! [`Environment`] implementation for the snake game.

use evosnake_engine::{Direction, SnakeGame, StepOutcome};

use crate::{
    controller::ActionIndex,
    environment::{Environment, InvalidActionError, Termination},
};

/// Length of the snake observation vector (`layers[0]`).
pub const OBSERVATION_LEN: usize = evosnake_engine::SENSOR_COUNT;

/// Number of snake actions (`layers[2]`).
pub const ACTION_COUNT: usize = Direction::LEN;

impl Environment for SnakeGame {
    fn observe(&self) -> Vec<f64> {
        self.sensors().to_vec()
    }

    fn apply(&mut self, action: ActionIndex) -> Result<Termination, InvalidActionError> {
        let direction =
            Direction::try_from(action).map_err(|e| InvalidActionError { action: e.index })?;
        let termination = match self.step(direction) {
            StepOutcome::Ongoing => Termination::Ongoing,
            StepOutcome::Win => Termination::Win,
            StepOutcome::Lose => Termination::Lose,
        };
        Ok(termination)
    }

    fn score(&self) -> usize {
        self.stats().score()
    }

    fn steps(&self) -> usize {
        self.stats().steps()
    }
}

#[cfg(test)]
mod tests {
    use evosnake_engine::GameSeed;

    use super::*;

    fn game() -> SnakeGame {
        SnakeGame::with_seed(6, GameSeed::from_bytes([3; 16]))
    }

    #[test]
    fn test_observation_has_input_dim() {
        assert_eq!(game().observe().len(), OBSERVATION_LEN);
    }

    #[test]
    fn test_apply_maps_actions_to_directions() {
        let mut game = game();
        let head = game.head();
        assert!(game.apply(Direction::Up.index()).is_ok());
        assert_eq!(game.head().y + 1, head.y);
        assert_eq!(Environment::steps(&game), 1);
    }

    #[test]
    fn test_apply_rejects_unknown_action() {
        let mut game = game();
        assert_eq!(
            game.apply(ACTION_COUNT),
            Err(InvalidActionError {
                action: ACTION_COUNT
            })
        );
        assert_eq!(Environment::steps(&game), 0);
    }

    #[test]
    fn test_running_into_wall_loses() {
        let mut game = game();
        let mut termination = Termination::Ongoing;
        for _ in 0..6 {
            termination = game.apply(Direction::Left.index()).unwrap();
            if termination.is_terminal() {
                break;
            }
        }
        assert_eq!(termination, Termination::Lose);
    }
}
