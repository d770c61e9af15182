use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::agent::Agent;
use super::heuristic::analyze;
use crate::game::{Board, Direction};

/// An agent that selects uniformly at random from the legal directions.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        RandomAgent {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomAgent {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn select_direction(&mut self, board: &Board) -> Option<Direction> {
        let legal: Vec<Direction> = analyze(board)
            .iter()
            .filter(|a| a.legal)
            .map(|a| a.direction)
            .collect();
        if legal.is_empty() {
            return None;
        }
        Some(legal[self.rng.random_range(0..legal.len())])
    }

    fn name(&self) -> &str {
        "Random"
    }
}
