/// Counters describing how well a game went.
///
/// - **Score**: number of food items eaten
/// - **Steps**: number of moves the snake survived
///
/// # Example
///
/// ```
/// use evosnake_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_move(true);
/// stats.complete_move(false);
///
/// assert_eq!(stats.score(), 1);
/// assert_eq!(stats.steps(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameStats {
    score: usize,
    steps: usize,
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self { score: 0, steps: 0 }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// Records one completed move, and whether food was eaten by it.
    pub const fn complete_move(&mut self, ate_food: bool) {
        self.steps += 1;
        if ate_food {
            self.score += 1;
        }
    }
}
