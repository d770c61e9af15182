//! Core 2048 game logic: the cell grid, tile shift/merge mechanics, spawn
//! rules, and terminal-state detection.

mod board;
mod direction;

pub use board::{Board, BoardSnapshot, CellSnapshot, ShiftOutcome, Tile};
pub use direction::{Direction, ALL_DIRECTIONS};
