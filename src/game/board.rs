use rand::Rng;

use super::Direction;
use crate::error::GameError;

/// A tile occupying one cell. Values are positive powers of two; `merged`
/// marks a tile created by a merge during the current shift so it cannot
/// merge again before the shift completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    value: u32,
    merged: bool,
}

impl Tile {
    fn new(value: u32) -> Self {
        Tile {
            value,
            merged: false,
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }
}

/// A fixed board position holding at most one tile. Neighbor links are
/// indices into the board's cell vector, wired once at construction in the
/// canonical order up/right/down/left; `None` marks a board edge.
#[derive(Debug, Clone)]
pub struct Cell {
    tile: Option<Tile>,
    neighbors: [Option<usize>; 4],
}

/// Result of a shift: whether anything moved or merged, and whether the
/// board is terminal afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftOutcome {
    pub moved: bool,
    pub game_over: bool,
}

/// Read-only view of one cell for rendering.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CellSnapshot {
    pub row: usize,
    pub col: usize,
    pub value: Option<u32>,
}

/// Read-only view of the whole board for rendering.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BoardSnapshot {
    pub size: usize,
    pub score: u64,
    pub game_over: bool,
    pub cells: Vec<CellSnapshot>,
}

/// The 2048 grid: a flat row-major vector of cells plus the running score
/// (sum of merge gains).
#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    start_tiles: usize,
    cells: Vec<Cell>,
    score: u64,
}

impl Board {
    /// Create a board with neighbor links wired and `start_tiles` tiles
    /// spawned.
    pub fn new<R: Rng>(size: usize, start_tiles: usize, rng: &mut R) -> Result<Self, GameError> {
        let mut board = Self::empty(size, start_tiles);
        board.spawn(rng, start_tiles)?;
        Ok(board)
    }

    /// An empty board with neighbor links but no tiles.
    pub(crate) fn empty(size: usize, start_tiles: usize) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for index in 0..size * size {
            let row = index / size;
            let col = index % size;
            let neighbors = [
                (row > 0).then(|| index - size),
                (col + 1 < size).then(|| index + 1),
                (row + 1 < size).then(|| index + size),
                (col > 0).then(|| index - 1),
            ];
            cells.push(Cell {
                tile: None,
                neighbors,
            });
        }
        Board {
            size,
            start_tiles,
            cells,
            score: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Tile value at a flat cell index, or `None` for an empty cell.
    pub fn value_at(&self, index: usize) -> Option<u32> {
        self.cells[index].tile.as_ref().map(Tile::value)
    }

    /// Neighbor cell index in the given direction, or `None` at an edge.
    pub fn neighbor(&self, index: usize, direction: Direction) -> Option<usize> {
        self.cells[index].neighbors[direction.index()]
    }

    /// Largest tile value on the board, 0 when empty.
    pub fn max_tile_value(&self) -> u32 {
        self.cells
            .iter()
            .filter_map(|c| c.tile.as_ref().map(Tile::value))
            .max()
            .unwrap_or(0)
    }

    fn empty_indices(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.tile.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Place `count` new tiles on uniformly random empty cells: value 2
    /// with probability 0.9, 4 otherwise. Spawning onto a full board is a
    /// caller error; the terminal check is supposed to run first.
    pub fn spawn<R: Rng>(&mut self, rng: &mut R, count: usize) -> Result<(), GameError> {
        for _ in 0..count {
            let open = self.empty_indices();
            if open.is_empty() {
                return Err(GameError::BoardFull);
            }
            let chosen = open[rng.random_range(0..open.len())];
            let value = if rng.random::<f64>() < 0.9 { 2 } else { 4 };
            self.cells[chosen].tile = Some(Tile::new(value));
        }
        Ok(())
    }

    /// Shift every tile as far as possible in `direction`, merging equal
    /// pairs once per destination, then spawn one tile if anything moved.
    ///
    /// Cells are processed nearest-to-farthest from the target edge so a
    /// chain of three equal tiles merges the two nearest the edge and
    /// leaves the third adjacent and unmerged.
    pub fn shift<R: Rng>(
        &mut self,
        rng: &mut R,
        direction: Direction,
    ) -> Result<ShiftOutcome, GameError> {
        for cell in &mut self.cells {
            if let Some(tile) = cell.tile.as_mut() {
                tile.merged = false;
            }
        }

        let n = self.cells.len();
        let order: Vec<usize> = match direction {
            // Row-major order walks rows top-down and columns left-right,
            // which is nearest-first for Up and Left; the reverse covers
            // Down and Right.
            Direction::Up | Direction::Left => (0..n).collect(),
            Direction::Down | Direction::Right => (0..n).rev().collect(),
        };

        let mut moved = false;
        for index in order {
            let Some(tile) = self.cells[index].tile else {
                continue;
            };

            // Slide through empty neighbors toward the target edge.
            let mut current = index;
            while let Some(next) = self.cells[current].neighbors[direction.index()] {
                if self.cells[next].tile.is_some() {
                    break;
                }
                current = next;
            }

            // Blocked by an equal tile that has not merged this shift?
            let blocking = self.cells[current].neighbors[direction.index()];
            let merge_target = blocking.filter(|&b| {
                self.cells[b]
                    .tile
                    .map(|t| t.value == tile.value && !t.merged)
                    .unwrap_or(false)
            });

            if let Some(target) = merge_target {
                self.cells[index].tile = None;
                let doubled = tile.value * 2;
                self.cells[target].tile = Some(Tile {
                    value: doubled,
                    merged: true,
                });
                self.score += u64::from(doubled);
                moved = true;
            } else if current != index {
                self.cells[index].tile = None;
                self.cells[current].tile = Some(tile);
                moved = true;
            }
        }

        if moved {
            // A move or merge always leaves an empty cell behind.
            self.spawn(rng, 1)?;
        }

        Ok(ShiftOutcome {
            moved,
            game_over: self.is_terminal(),
        })
    }

    /// True iff every cell is occupied and no occupied cell has a neighbor
    /// holding an equal value.
    pub fn is_terminal(&self) -> bool {
        for cell in &self.cells {
            let Some(tile) = cell.tile else {
                return false;
            };
            for neighbor in cell.neighbors.into_iter().flatten() {
                match self.cells[neighbor].tile {
                    None => return false,
                    Some(other) if other.value == tile.value => return false,
                    Some(_) => {}
                }
            }
        }
        true
    }

    /// Clear all tiles, zero the score, and respawn the starting tiles.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) -> Result<(), GameError> {
        for cell in &mut self.cells {
            cell.tile = None;
        }
        self.score = 0;
        self.spawn(rng, self.start_tiles)
    }

    /// Read-only snapshot for the rendering collaborator.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            size: self.size,
            score: self.score,
            game_over: self.is_terminal(),
            cells: self
                .cells
                .iter()
                .enumerate()
                .map(|(i, c)| CellSnapshot {
                    row: i / self.size,
                    col: i % self.size,
                    value: c.tile.as_ref().map(Tile::value),
                })
                .collect(),
        }
    }

    /// Sum of all tile values. Each merge removes two tiles worth 2V and
    /// adds one worth 2V, so a shift leaves this unchanged until the
    /// automatic spawn.
    pub fn tile_sum(&self) -> u64 {
        self.cells
            .iter()
            .filter_map(|c| c.tile.as_ref())
            .map(|t| u64::from(t.value))
            .sum()
    }

    /// Place a tile directly on an empty cell, bypassing the spawn rule.
    pub(crate) fn place(&mut self, row: usize, col: usize, value: u32) {
        let index = row * self.size + col;
        debug_assert!(self.cells[index].tile.is_none(), "cell already occupied");
        self.cells[index].tile = Some(Tile::new(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::direction::ALL_DIRECTIONS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    /// Tile values in row-major order, 0 for empty.
    fn values(board: &Board) -> Vec<u32> {
        (0..board.cell_count())
            .map(|i| board.value_at(i).unwrap_or(0))
            .collect()
    }

    #[test]
    fn test_new_board_spawns_start_tiles() {
        let board = Board::new(4, 2, &mut rng()).unwrap();
        let occupied = values(&board).iter().filter(|&&v| v != 0).count();
        assert_eq!(occupied, 2);
        assert_eq!(board.score(), 0);
    }

    #[test]
    fn test_neighbor_wiring_honors_edges() {
        let board = Board::empty(4, 2);
        // Top-left corner: no up, no left.
        assert_eq!(board.neighbor(0, Direction::Up), None);
        assert_eq!(board.neighbor(0, Direction::Left), None);
        assert_eq!(board.neighbor(0, Direction::Right), Some(1));
        assert_eq!(board.neighbor(0, Direction::Down), Some(4));
        // Bottom-right corner: no down, no right.
        assert_eq!(board.neighbor(15, Direction::Down), None);
        assert_eq!(board.neighbor(15, Direction::Right), None);
        assert_eq!(board.neighbor(15, Direction::Up), Some(11));
        assert_eq!(board.neighbor(15, Direction::Left), Some(14));
        // Interior cell has all four.
        for dir in ALL_DIRECTIONS {
            assert!(board.neighbor(5, dir).is_some());
        }
    }

    #[test]
    fn test_spawn_values_are_two_or_four() {
        let mut board = Board::empty(4, 2);
        board.spawn(&mut rng(), 16).unwrap();
        for v in values(&board) {
            assert!(v == 2 || v == 4, "unexpected spawn value {}", v);
        }
    }

    #[test]
    fn test_spawn_on_full_board_is_an_error() {
        let mut board = Board::empty(2, 2);
        board.spawn(&mut rng(), 4).unwrap();
        assert!(matches!(
            board.spawn(&mut rng(), 1),
            Err(GameError::BoardFull)
        ));
    }

    #[test]
    fn test_merge_doubles_value_and_scores() {
        let mut board = Board::empty(4, 2);
        board.place(0, 0, 2);
        board.place(0, 1, 2);
        let outcome = board.shift(&mut rng(), Direction::Left).unwrap();
        assert!(outcome.moved);
        assert_eq!(board.value_at(0), Some(4));
        assert_eq!(board.score(), 4);
    }

    #[test]
    fn test_merge_conserves_tile_sum() {
        let mut board = Board::empty(4, 2);
        board.place(1, 0, 4);
        board.place(1, 2, 4);
        board.place(2, 1, 2);
        board.place(2, 3, 2);
        let sum_before = board.tile_sum();
        let outcome = board.shift(&mut rng(), Direction::Left).unwrap();
        assert!(outcome.moved);
        // One spawned tile was added after the shift; subtract it back out.
        let spawned: u64 = board.tile_sum() - sum_before;
        assert!(spawned == 2 || spawned == 4);
        assert_eq!(board.score(), 8 + 4);
    }

    #[test]
    fn test_no_legal_move_leaves_board_unchanged() {
        let mut board = Board::empty(2, 2);
        board.place(0, 0, 2);
        board.place(0, 1, 4);
        board.place(1, 0, 8);
        board.place(1, 1, 16);
        let before = values(&board);
        let score_before = board.score();
        let outcome = board.shift(&mut rng(), Direction::Up).unwrap();
        assert!(!outcome.moved);
        assert_eq!(values(&board), before);
        assert_eq!(board.score(), score_before);
    }

    #[test]
    fn test_each_tile_merges_at_most_once() {
        // [2,2,2,_] shifted right merges the two nearest the target edge:
        // [_,_,2,4], then one spawn lands elsewhere.
        let mut board = Board::empty(4, 2);
        board.place(0, 0, 2);
        board.place(0, 1, 2);
        board.place(0, 2, 2);
        board.shift(&mut rng(), Direction::Right).unwrap();
        assert_eq!(board.value_at(3), Some(4));
        assert_eq!(board.value_at(2), Some(2));
        assert_eq!(board.score(), 4);
    }

    #[test]
    fn test_merged_tile_does_not_merge_again() {
        // [4,2,2] shifted left must become [4,4], not [8].
        let mut board = Board::empty(4, 2);
        board.place(0, 0, 4);
        board.place(0, 1, 2);
        board.place(0, 2, 2);
        board.shift(&mut rng(), Direction::Left).unwrap();
        assert_eq!(board.value_at(0), Some(4));
        assert_eq!(board.value_at(1), Some(4));
        assert_eq!(board.score(), 4);
    }

    #[test]
    fn test_four_equal_tiles_merge_pairwise() {
        let mut board = Board::empty(4, 2);
        for col in 0..4 {
            board.place(0, col, 2);
        }
        board.shift(&mut rng(), Direction::Left).unwrap();
        assert_eq!(board.value_at(0), Some(4));
        assert_eq!(board.value_at(1), Some(4));
        assert_eq!(board.score(), 8);
    }

    #[test]
    fn test_shift_spawns_exactly_one_tile_after_move() {
        let mut board = Board::empty(4, 2);
        board.place(3, 3, 2);
        board.shift(&mut rng(), Direction::Up).unwrap();
        let occupied = values(&board).iter().filter(|&&v| v != 0).count();
        assert_eq!(occupied, 2);
        assert_eq!(board.value_at(3), Some(2));
    }

    #[test]
    fn test_terminal_requires_full_board() {
        let mut board = Board::empty(2, 2);
        board.place(0, 0, 2);
        board.place(0, 1, 4);
        board.place(1, 0, 8);
        assert!(!board.is_terminal());
    }

    #[test]
    fn test_terminal_full_board_no_equal_neighbors() {
        let mut board = Board::empty(2, 2);
        board.place(0, 0, 2);
        board.place(0, 1, 4);
        board.place(1, 0, 8);
        board.place(1, 1, 16);
        assert!(board.is_terminal());
    }

    #[test]
    fn test_full_board_with_equal_neighbors_is_not_terminal() {
        let mut board = Board::empty(2, 2);
        board.place(0, 0, 2);
        board.place(0, 1, 4);
        board.place(1, 0, 8);
        board.place(1, 1, 4);
        assert!(!board.is_terminal());
    }

    #[test]
    fn test_terminal_matches_definition_on_random_boards() {
        let mut rng = rng();
        for _ in 0..200 {
            let mut board = Board::empty(4, 2);
            for row in 0..4 {
                for col in 0..4 {
                    let roll: f64 = rand::Rng::random(&mut rng);
                    if roll < 0.8 {
                        let exp = rand::Rng::random_range(&mut rng, 1..=4u32);
                        board.place(row, col, 1 << exp);
                    }
                }
            }

            let full = (0..board.cell_count()).all(|i| board.value_at(i).is_some());
            let mergeable = (0..board.cell_count()).any(|i| {
                board.value_at(i).is_some_and(|v| {
                    ALL_DIRECTIONS.iter().any(|&d| {
                        board
                            .neighbor(i, d)
                            .and_then(|n| board.value_at(n))
                            .is_some_and(|nv| nv == v)
                    })
                })
            });
            assert_eq!(board.is_terminal(), full && !mergeable);
        }
    }

    #[test]
    fn test_reset_clears_score_and_respawns() {
        let mut rng = rng();
        let mut board = Board::new(4, 2, &mut rng).unwrap();
        board.place(2, 2, 2);
        board.reset(&mut rng).unwrap();
        assert_eq!(board.score(), 0);
        let occupied = values(&board).iter().filter(|&&v| v != 0).count();
        assert_eq!(occupied, 2);
    }

    #[test]
    fn test_snapshot_reports_positions_and_values() {
        let mut board = Board::empty(4, 2);
        board.place(1, 2, 8);
        let snap = board.snapshot();
        assert_eq!(snap.size, 4);
        assert_eq!(snap.cells.len(), 16);
        let cell = &snap.cells[4 + 2];
        assert_eq!((cell.row, cell.col), (1, 2));
        assert_eq!(cell.value, Some(8));
        assert!(!snap.game_over);
    }

    #[test]
    fn test_forced_spawn_merge_scenario() {
        // Two forced 2s at (0,0) and (0,1); shifting left merges them into
        // a 4 at (0,0), scores 4, and spawns exactly one new tile.
        let mut board = Board::empty(4, 2);
        board.place(0, 0, 2);
        board.place(0, 1, 2);
        let outcome = board.shift(&mut rng(), Direction::Left).unwrap();
        assert!(outcome.moved);
        assert_eq!(board.value_at(0), Some(4));
        assert_eq!(board.score(), 4);
        let occupied = values(&board).iter().filter(|&&v| v != 0).count();
        assert_eq!(occupied, 2);
    }
}
