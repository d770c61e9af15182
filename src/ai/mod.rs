//! The players: the agent trait, the directional heuristic, the random
//! baseline, and the feed-forward network the weight search tunes.

mod agent;
pub mod heuristic;
mod network;
mod random;

pub use agent::Agent;
pub use heuristic::{analyze, best_direction, DirectionAnalysis, HeuristicAgent};
pub use network::{
    squash, ConnectionSnapshot, InputEncoding, Network, NetworkSnapshot, NetworkState,
    NodeSnapshot,
};
pub use random::RandomAgent;
