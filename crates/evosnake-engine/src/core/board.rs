use std::fmt;

use super::direction::Position;

/// Sensor value reported for a cell outside the board.
pub const WALL_SENSOR: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::IsVariant)]
pub enum Cell {
    #[default]
    Empty,
    Snake,
    Food,
}

impl Cell {
    /// Numeric value of this cell as seen by the snake's sensors.
    ///
    /// Deadly cells (snake body) share the value of walls.
    #[must_use]
    pub const fn sensor_value(self) -> f64 {
        match self {
            Cell::Empty => 0.0,
            Cell::Food => 1.0,
            Cell::Snake => WALL_SENSOR,
        }
    }
}

/// A square grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// # Panics
    ///
    /// Panics if `pos` is outside the board.
    #[must_use]
    pub fn cell(&self, pos: Position) -> Cell {
        self.cells[self.offset(pos)]
    }

    pub fn set_cell(&mut self, pos: Position, cell: Cell) {
        let offset = self.offset(pos);
        self.cells[offset] = cell;
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let size = self.size;
        (0..size).flat_map(move |y| (0..size).map(move |x| Position::new(x, y)))
    }

    pub fn empty_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(|pos| self.cell(*pos).is_empty())
    }

    fn offset(&self, pos: Position) -> usize {
        assert!(
            pos.x < self.size && pos.y < self.size,
            "position {pos:?} outside {0}x{0} board",
            self.size
        );
        pos.y * self.size + pos.x
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size) {
            for cell in row {
                let ch = match cell {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_cell() {
        let mut board = Board::new(3);
        let pos = Position::new(2, 1);
        assert!(board.cell(pos).is_empty());
        board.set_cell(pos, Cell::Food);
        assert_eq!(board.cell(pos), Cell::Food);
        assert_eq!(board.empty_positions().count(), 8);
    }

    #[test]
    fn test_positions_are_row_major() {
        let board = Board::new(2);
        let positions = board.positions().collect::<Vec<_>>();
        assert_eq!(
            positions,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(0, 1),
                Position::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_display() {
        let mut board = Board::new(2);
        board.set_cell(Position::new(1, 0), Cell::Snake);
        board.set_cell(Position::new(0, 1), Cell::Food);
        assert_eq!(board.to_string(), ".o\n*.\n");
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_bounds_panics() {
        let board = Board::new(2);
        let _ = board.cell(Position::new(2, 0));
    }
}
