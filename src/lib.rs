//! # ml-2048
//!
//! A 2048 player: a hand-rolled feed-forward network picks moves, and an
//! elitist random-perturbation hill-climb tunes its weights using in-game
//! score as fitness. No gradients anywhere.
//!
//! ## Modules
//!
//! - [`game`] — Grid engine: cells, tiles, shift/merge mechanics, terminal detection
//! - [`ai`] — Directional heuristic, random baseline, the network and its snapshots
//! - [`training`] — Weight search, episode driver, trainer loop, metrics
//! - [`session`] — The session object owning board, network, and search state
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod session;
pub mod training;
