use crate::game::{Board, Direction};

/// Universal interface for autoplay agents that read the board and pick a
/// shift direction. Returns `None` when no direction is legal.
pub trait Agent {
    fn select_direction(&mut self, board: &Board) -> Option<Direction>;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}
