use crate::error::GameError;

/// One of the four shift directions, in the canonical neighbor order
/// used throughout the board: up, right, down, left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

/// All directions in index order 0..4.
pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];

impl Direction {
    /// Index into per-cell neighbor arrays and network output layers.
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// Parse an external direction command. Out-of-range indices are
    /// rejected, not clamped.
    pub fn from_index(index: usize) -> Result<Direction, GameError> {
        match index {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Right),
            2 => Ok(Direction::Down),
            3 => Ok(Direction::Left),
            other => Err(GameError::InvalidDirection(other)),
        }
    }

    /// Get direction name for display
    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Right => "Right",
            Direction::Down => "Down",
            Direction::Left => "Left",
        }
    }
}
