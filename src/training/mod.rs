//! The weight search and its infrastructure: the elitist hill-climb, the
//! per-tick episode driver, the training loop, and score metrics.

pub mod episode;
pub mod metrics;
pub mod search;
pub mod trainer;

pub use episode::{choose_move, EpisodeDriver, EpisodeEnd};
pub use metrics::SearchMetrics;
pub use search::{IterationReport, WeightSearch};
pub use trainer::Trainer;
