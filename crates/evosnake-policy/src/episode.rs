//! Running a controller through one episode of an environment.
//!
//! An [`Episode`] advances one step per [`Episode::tick`], which lets the
//! replay mode drive it from an external clock. [`run_episode`] simply ticks
//! until the episode finishes and is what fitness evaluation uses.
//!
//! Every episode is bounded: after `max_steps` controller calls it finishes as
//! [`EpisodeTermination::Truncated`] even if the environment never signals
//! termination. Truncation is a normal outcome, not an error.

use crate::{
    controller::Controller,
    environment::{Environment, InvalidActionError, Termination},
    weights::{ShapeError, WeightSet},
};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EpisodeError {
    #[display("controller rejected its input")]
    Shape(ShapeError),
    #[display("environment rejected the controller's action")]
    InvalidAction(InvalidActionError),
}

/// One evaluated individual: its weights and how well it did.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub weights: WeightSet,
    pub score: usize,
    pub steps: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum EpisodeTermination {
    #[display("win")]
    Win,
    #[display("lose")]
    Lose,
    /// The step budget ran out before the environment terminated.
    #[display("truncated")]
    Truncated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeOutcome {
    pub termination: EpisodeTermination,
    pub score: usize,
    pub steps: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum EpisodeTick {
    Running,
    Finished(EpisodeOutcome),
}

/// A controller acting in its own environment.
#[derive(Debug)]
pub struct Episode<E> {
    controller: Controller,
    environment: E,
    max_steps: usize,
    controller_calls: usize,
    outcome: Option<EpisodeOutcome>,
}

impl<E> Episode<E>
where
    E: Environment,
{
    #[must_use]
    pub fn new(controller: Controller, environment: E, max_steps: usize) -> Self {
        Self {
            controller,
            environment,
            max_steps,
            controller_calls: 0,
            outcome: None,
        }
    }

    #[must_use]
    pub fn environment(&self) -> &E {
        &self.environment
    }

    #[must_use]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Number of times the controller has been asked for an action.
    #[must_use]
    pub fn controller_calls(&self) -> usize {
        self.controller_calls
    }

    /// The final outcome, once the episode has finished.
    #[must_use]
    pub fn outcome(&self) -> Option<EpisodeOutcome> {
        self.outcome
    }

    /// Observes, decides and acts once.
    ///
    /// After the episode has finished, returns the same outcome again without
    /// touching the controller or the environment.
    pub fn tick(&mut self) -> Result<EpisodeTick, EpisodeError> {
        if let Some(outcome) = self.outcome {
            return Ok(EpisodeTick::Finished(outcome));
        }
        if self.controller_calls >= self.max_steps {
            return Ok(self.finish(EpisodeTermination::Truncated));
        }

        let observation = self.environment.observe();
        let action = self.controller.decide(&observation)?;
        self.controller_calls += 1;

        let tick = match self.environment.apply(action)? {
            Termination::Win => self.finish(EpisodeTermination::Win),
            Termination::Lose => self.finish(EpisodeTermination::Lose),
            Termination::Ongoing if self.controller_calls >= self.max_steps => {
                self.finish(EpisodeTermination::Truncated)
            }
            Termination::Ongoing => EpisodeTick::Running,
        };
        Ok(tick)
    }

    /// Ticks until the episode finishes.
    pub fn run_to_end(&mut self) -> Result<EpisodeOutcome, EpisodeError> {
        loop {
            if let EpisodeTick::Finished(outcome) = self.tick()? {
                return Ok(outcome);
            }
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (Controller, E) {
        (self.controller, self.environment)
    }

    fn finish(&mut self, termination: EpisodeTermination) -> EpisodeTick {
        let outcome = EpisodeOutcome {
            termination,
            score: self.environment.score(),
            steps: self.environment.steps(),
        };
        self.outcome = Some(outcome);
        EpisodeTick::Finished(outcome)
    }
}

/// Plays one episode of `environment` with `weights` and reports the result.
///
/// The returned [`Individual`] carries the very weights passed in, unchanged.
pub fn run_episode<E>(
    weights: WeightSet,
    environment: &mut E,
    max_steps: usize,
) -> Result<Individual, EpisodeError>
where
    E: Environment,
{
    let controller = Controller::new(weights)?;
    let mut episode = Episode::new(controller, environment, max_steps);
    let outcome = episode.run_to_end()?;
    let (controller, _) = episode.into_parts();
    Ok(Individual {
        weights: controller.into_weights(),
        score: outcome.score,
        steps: outcome.steps,
    })
}
