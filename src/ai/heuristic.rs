use super::agent::Agent;
use crate::game::{Board, Direction, ALL_DIRECTIONS};

/// What one shift direction would do to the current board: whether any tile
/// can slide or merge that way, how many adjacent equal pairs it would
/// merge, and the score those merges would gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionAnalysis {
    pub direction: Direction,
    pub legal: bool,
    pub merge_count: u32,
    pub merge_gain: u64,
}

/// Analyze all four directions in index order.
pub fn analyze(board: &Board) -> [DirectionAnalysis; 4] {
    ALL_DIRECTIONS.map(|direction| {
        let mut legal = false;
        let mut merge_count = 0u32;
        let mut merge_gain = 0u64;

        for index in 0..board.cell_count() {
            let Some(value) = board.value_at(index) else {
                continue;
            };
            let Some(neighbor) = board.neighbor(index, direction) else {
                continue;
            };
            match board.value_at(neighbor) {
                None => legal = true,
                Some(nv) if nv == value => {
                    legal = true;
                    merge_count += 1;
                    merge_gain += u64::from(value) * 2;
                }
                Some(_) => {}
            }
        }

        DirectionAnalysis {
            direction,
            legal,
            merge_count,
            merge_gain,
        }
    })
}

/// The direction merging the most adjacent pairs. The gain score is
/// computed but deliberately not used for selection; ties break to the
/// lowest direction index. `None` when the board is stuck.
pub fn best_direction(board: &Board) -> Option<Direction> {
    let mut best: Option<DirectionAnalysis> = None;
    for analysis in analyze(board) {
        if !analysis.legal {
            continue;
        }
        match best {
            Some(b) if analysis.merge_count <= b.merge_count => {}
            _ => best = Some(analysis),
        }
    }
    best.map(|b| b.direction)
}

/// Autoplay agent driven by the most-combinations rule. Also serves as a
/// diagnostic the network's choice can be compared against.
#[derive(Debug, Default)]
pub struct HeuristicAgent;

impl HeuristicAgent {
    pub fn new() -> Self {
        HeuristicAgent
    }
}

impl Agent for HeuristicAgent {
    fn select_direction(&mut self, board: &Board) -> Option<Direction> {
        best_direction(board)
    }

    fn name(&self) -> &str {
        "Heuristic"
    }
}
