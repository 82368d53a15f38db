//! The contract between a controller and the world it acts in.

use crate::controller::ActionIndex;

/// Signal returned by an environment after applying an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Termination {
    Ongoing,
    Win,
    Lose,
}

impl Termination {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !self.is_ongoing()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("environment rejected action {action}")]
pub struct InvalidActionError {
    pub action: ActionIndex,
}

/// A simulated world driven by discrete actions.
///
/// A fresh environment is obtained by constructing a new value; episodes never
/// share an environment, so implementations need no synchronization.
pub trait Environment {
    /// Current observation, of fixed length `layers[0]`.
    fn observe(&self) -> Vec<f64>;

    /// Applies `action` and advances the world by one step.
    fn apply(&mut self, action: ActionIndex) -> Result<Termination, InvalidActionError>;

    /// Task score so far; final once a terminal signal was returned.
    fn score(&self) -> usize;

    /// Number of steps survived so far.
    fn steps(&self) -> usize;
}

impl<E> Environment for &mut E
where
    E: Environment + ?Sized,
{
    fn observe(&self) -> Vec<f64> {
        (**self).observe()
    }

    fn apply(&mut self, action: ActionIndex) -> Result<Termination, InvalidActionError> {
        (**self).apply(action)
    }

    fn score(&self) -> usize {
        (**self).score()
    }

    fn steps(&self) -> usize {
        (**self).steps()
    }
}
