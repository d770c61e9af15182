use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ai::{Agent, HeuristicAgent, Network, NetworkSnapshot, RandomAgent};
use crate::config::AppConfig;
use crate::error::{GameError, SessionError};
use crate::game::{Board, BoardSnapshot, Direction, ShiftOutcome};
use crate::training::{EpisodeDriver, EpisodeEnd, IterationReport, WeightSearch};

/// Who drives the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// External move commands only.
    Manual,
    /// Most-combinations heuristic autoplay.
    Heuristic,
    /// Uniform random legal moves.
    Random,
    /// Network autoplay with the weight search recording episodes.
    Search,
}

/// What one tick did.
#[derive(Debug)]
pub enum TickEvent {
    /// Nothing to do (manual mode, or the search has finished).
    Idle,
    /// One move was applied; the episode continues.
    Stepped,
    /// An episode finished and the board was reset. `report` is present
    /// when the episode also completed a search iteration.
    EpisodeEnded {
        end: EpisodeEnd,
        report: Option<IterationReport>,
    },
}

/// One logical play/training session: exclusive owner of the board, the
/// network, the weight-search state, and the RNG. All methods are strictly
/// sequential; an external driver calls [`Session::tick`] once per tick.
pub struct Session {
    config: AppConfig,
    board: Board,
    network: Network,
    search: WeightSearch,
    driver: EpisodeDriver,
    heuristic: HeuristicAgent,
    random: RandomAgent,
    mode: Mode,
    autoplay_moves: usize,
    rng: StdRng,
}

impl Session {
    /// Build a session from a validated config. `seed` makes every spawn,
    /// weight initialization, and perturbation reproducible.
    pub fn new(config: AppConfig, seed: Option<u64>) -> Result<Self, SessionError> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let board = Board::new(config.game.board_size, config.game.start_tiles, &mut rng)?;
        let network = Network::new(
            config.network.layer_sizes(board.cell_count()),
            config.network.input_encoding,
            &mut rng,
        );
        let search = WeightSearch::new(&config.search);
        let driver = EpisodeDriver::new(config.search.invalid_move_tolerance);
        let random = RandomAgent::seeded(rng.random());
        Ok(Session {
            config,
            board,
            network,
            search,
            driver,
            heuristic: HeuristicAgent::new(),
            random,
            mode: Mode::Search,
            autoplay_moves: 0,
            rng,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn search(&self) -> &WeightSearch {
        &self.search
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Read-only board state for rendering.
    pub fn board_snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    /// Read-only network state for rendering.
    pub fn network_snapshot(&self) -> NetworkSnapshot {
        self.network.snapshot()
    }

    /// Switch who drives the board. Any in-progress episode is discarded
    /// without being recorded.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), SessionError> {
        if mode != self.mode {
            self.mode = mode;
            self.driver.reset();
            self.autoplay_moves = 0;
            self.board.reset(&mut self.rng)?;
        }
        Ok(())
    }

    /// Apply an external direction command through the same shift path the
    /// automated modes use. Indices outside 0..4 are rejected.
    pub fn manual_move(&mut self, direction_index: usize) -> Result<ShiftOutcome, GameError> {
        let direction = Direction::from_index(direction_index)?;
        self.board.shift(&mut self.rng, direction)
    }

    /// Advance the session by one simulated tick.
    pub fn tick(&mut self) -> Result<TickEvent, SessionError> {
        match self.mode {
            Mode::Manual => Ok(TickEvent::Idle),
            Mode::Search => self.search_tick(),
            Mode::Heuristic | Mode::Random => self.autoplay_tick(),
        }
    }

    fn search_tick(&mut self) -> Result<TickEvent, SessionError> {
        if self.search.is_done() {
            return Ok(TickEvent::Idle);
        }
        match self
            .driver
            .tick(&mut self.board, &mut self.network, &mut self.rng)?
        {
            None => Ok(TickEvent::Stepped),
            Some(end) => {
                let report =
                    self.search
                        .record_episode(&mut self.network, end.score, &mut self.rng)?;
                self.board.reset(&mut self.rng)?;
                Ok(TickEvent::EpisodeEnded { end, report })
            }
        }
    }

    fn autoplay_tick(&mut self) -> Result<TickEvent, SessionError> {
        let direction = match self.mode {
            Mode::Heuristic => self.heuristic.select_direction(&self.board),
            Mode::Random => self.random.select_direction(&self.board),
            _ => unreachable!(),
        };

        let game_over = match direction {
            None => true,
            Some(direction) => {
                let outcome = self.board.shift(&mut self.rng, direction)?;
                self.autoplay_moves += 1;
                outcome.game_over
            }
        };

        if game_over {
            let end = EpisodeEnd {
                score: self.board.score(),
                moves: self.autoplay_moves,
            };
            self.autoplay_moves = 0;
            self.board.reset(&mut self.rng)?;
            return Ok(TickEvent::EpisodeEnded { end, report: None });
        }
        Ok(TickEvent::Stepped)
    }
}
