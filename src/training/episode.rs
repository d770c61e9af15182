use rand::Rng;

use crate::ai::Network;
use crate::error::GameError;
use crate::game::{Board, Direction, ALL_DIRECTIONS};

/// A finished episode: terminal score and how many ticks it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeEnd {
    pub score: u64,
    pub moves: usize,
}

/// Direction with the maximum output score; the first seen wins exact ties.
pub fn choose_move(outputs: &[f64]) -> Direction {
    debug_assert_eq!(outputs.len(), 4);
    let mut best = Direction::Up;
    for direction in ALL_DIRECTIONS {
        if outputs[direction.index()] > outputs[best.index()] {
            best = direction;
        }
    }
    best
}

/// Ties network outputs to board moves once per simulated tick and decides
/// when an episode is over: either the board went terminal, or the network
/// kept picking directions in which nothing could move.
#[derive(Debug)]
pub struct EpisodeDriver {
    invalid_move_tolerance: usize,
    invalid_moves: usize,
    moves: usize,
}

impl EpisodeDriver {
    pub fn new(invalid_move_tolerance: usize) -> Self {
        EpisodeDriver {
            invalid_move_tolerance,
            invalid_moves: 0,
            moves: 0,
        }
    }

    /// Forget any in-progress episode.
    pub fn reset(&mut self) {
        self.invalid_moves = 0;
        self.moves = 0;
    }

    /// One tick: evaluate the network on the board, apply the chosen shift,
    /// track invalid choices. Returns the episode result when it ended.
    pub fn tick<R: Rng>(
        &mut self,
        board: &mut Board,
        network: &mut Network,
        rng: &mut R,
    ) -> Result<Option<EpisodeEnd>, GameError> {
        let direction = {
            let outputs = network.evaluate(board);
            choose_move(outputs)
        };
        let outcome = board.shift(rng, direction)?;
        self.moves += 1;

        if outcome.game_over {
            return Ok(Some(self.finish(board)));
        }

        if outcome.moved {
            self.invalid_moves = 0;
        } else {
            self.invalid_moves += 1;
            if self.invalid_moves > self.invalid_move_tolerance {
                return Ok(Some(self.finish(board)));
            }
        }
        Ok(None)
    }

    fn finish(&mut self, board: &Board) -> EpisodeEnd {
        let end = EpisodeEnd {
            score: board.score(),
            moves: self.moves,
        };
        self.reset();
        end
    }
}
