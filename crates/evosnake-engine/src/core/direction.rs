use crate::UnknownDirectionError;

/// A cell coordinate on the board.
///
/// `x` grows to the right and `y` grows downwards, so `(0, 0)` is the
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Returns the neighbouring position in `direction`, or `None` when it
    /// would leave a `size` x `size` board.
    #[must_use]
    pub fn neighbor(self, direction: Direction, size: usize) -> Option<Self> {
        let Self { x, y } = self;
        let (x, y) = match direction {
            Direction::Right => (x.checked_add(1)?, y),
            Direction::Left => (x.checked_sub(1)?, y),
            Direction::Down => (x, y.checked_add(1)?),
            Direction::Up => (x, y.checked_sub(1)?),
        };
        (x < size && y < size).then_some(Self { x, y })
    }

    /// Chebyshev distance (the larger of the two axis distances).
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> usize {
        usize::max(self.x.abs_diff(other.x), self.y.abs_diff(other.y))
    }
}

/// Absolute movement direction of the snake.
///
/// The discriminant order is the action index order used by controllers and
/// by the sensor layout of [`SnakeGame::sensors`](crate::SnakeGame::sensors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Direction {
    #[display("right")]
    Right,
    #[display("left")]
    Left,
    #[display("down")]
    Down,
    #[display("up")]
    Up,
}

impl Direction {
    pub const LEN: usize = 4;
    pub const ALL: [Self; Self::LEN] = [Self::Right, Self::Left, Self::Down, Self::Up];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Direction {
    type Error = UnknownDirectionError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(UnknownDirectionError { index })
    }
}
