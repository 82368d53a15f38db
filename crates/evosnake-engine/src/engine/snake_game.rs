use std::{collections::VecDeque, fmt};

use rand::{Rng as _, SeedableRng as _, seq::IteratorRandom as _};
use rand_pcg::Pcg32;

use crate::core::{Board, Cell, Direction, Position, WALL_SENSOR};

use super::{GameSeed, GameStats};

/// Number of values returned by [`SnakeGame::sensors`].
pub const SENSOR_COUNT: usize = Direction::LEN + 1;

/// Result of a single move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum StepOutcome {
    Ongoing,
    /// The snake filled the whole board.
    Win,
    /// The snake left the board or ran into itself.
    Lose,
}

impl StepOutcome {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !self.is_ongoing()
    }
}

/// A game of snake on a square board.
///
/// The snake starts with length 1 at the centre of the board and a single
/// food item is placed on a random empty cell. Each call to [`Self::step`]
/// moves the head one cell. Eating food grows the snake by one cell and
/// spawns new food; when no empty cell is left the game is won.
#[derive(Debug, Clone)]
pub struct SnakeGame {
    board: Board,
    // front is the head
    body: VecDeque<Position>,
    food: Option<Position>,
    rng: Pcg32,
    stats: GameStats,
    outcome: StepOutcome,
}

impl SnakeGame {
    /// Creates a new game with a random seed.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self::with_seed(size, rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic food placement.
    ///
    /// # Panics
    ///
    /// Panics if `size` is smaller than 2.
    #[must_use]
    pub fn with_seed(size: usize, seed: GameSeed) -> Self {
        assert!(size >= 2, "board size must be at least 2, got {size}");
        let mut board = Board::new(size);
        let head = Position::new(size / 2, size / 2);
        board.set_cell(head, Cell::Snake);
        let mut this = Self {
            board,
            body: VecDeque::from([head]),
            food: None,
            rng: Pcg32::from_seed(seed.to_bytes()),
            stats: GameStats::new(),
            outcome: StepOutcome::Ongoing,
        };
        this.place_food();
        this
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn head(&self) -> Position {
        self.body[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    #[must_use]
    pub fn food(&self) -> Option<Position> {
        self.food
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Outcome of the last move, `Ongoing` before the first one.
    #[must_use]
    pub fn outcome(&self) -> StepOutcome {
        self.outcome
    }

    /// Values describing the head's surroundings.
    ///
    /// The first four entries are the [`Cell::sensor_value`] of the neighbours
    /// in [`Direction::ALL`] order ([`WALL_SENSOR`] outside the board). The
    /// last entry is the Chebyshev distance from the head to the food, or `0`
    /// when there is no food.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn sensors(&self) -> [f64; SENSOR_COUNT] {
        let head = self.head();
        let size = self.board.size();
        let mut sensors = [0.0; SENSOR_COUNT];
        for (sensor, direction) in sensors.iter_mut().zip(Direction::ALL) {
            *sensor = head
                .neighbor(direction, size)
                .map_or(WALL_SENSOR, |pos| self.board.cell(pos).sensor_value());
        }
        sensors[Direction::LEN] = self
            .food
            .map_or(0.0, |food| head.chebyshev_distance(food) as f64);
        sensors
    }

    /// Moves the snake one cell in `direction`.
    ///
    /// Once the game reached a terminal outcome, further calls return that
    /// outcome without changing the game.
    pub fn step(&mut self, direction: Direction) -> StepOutcome {
        if self.outcome.is_terminal() {
            return self.outcome;
        }

        let Some(next) = self.head().neighbor(direction, self.board.size()) else {
            self.outcome = StepOutcome::Lose;
            return self.outcome;
        };

        let ate_food = self.food == Some(next);
        let tail = *self.body.back().expect("snake body is never empty");
        let hits_body = self.board.cell(next).is_snake() && (ate_food || next != tail);
        if hits_body {
            self.outcome = StepOutcome::Lose;
            return self.outcome;
        }

        if !ate_food {
            self.body.pop_back();
            self.board.set_cell(tail, Cell::Empty);
        }
        self.body.push_front(next);
        self.board.set_cell(next, Cell::Snake);
        self.stats.complete_move(ate_food);

        if ate_food {
            self.food = None;
            self.place_food();
        }
        self.outcome
    }

    fn place_food(&mut self) {
        match self.board.empty_positions().choose(&mut self.rng) {
            Some(pos) => {
                self.board.set_cell(pos, Cell::Food);
                self.food = Some(pos);
            }
            None => self.outcome = StepOutcome::Win,
        }
    }
}

impl fmt::Display for SnakeGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = self.head();
        for y in 0..self.board.size() {
            for x in 0..self.board.size() {
                let pos = Position::new(x, y);
                let ch = match self.board.cell(pos) {
                    _ if pos == head => '@',
                    Cell::Empty => '.',
                    Cell::Snake => 'o',
                    Cell::Food => '*',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
