use std::collections::VecDeque;

use super::episode::EpisodeEnd;

/// Episode statistics tracker with rolling window computations.
pub struct SearchMetrics {
    episodes: VecDeque<EpisodeEnd>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
    best_score: u64,
}

impl SearchMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        SearchMetrics {
            episodes: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
            best_score: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_episode(&mut self, end: EpisodeEnd) {
        self.total_episodes += 1;
        self.best_score = self.best_score.max(end.score);
        self.episodes.push_back(end);
        if self.episodes.len() > self.capacity {
            self.episodes.pop_front();
        }
    }

    /// Mean score over the last N episodes.
    pub fn average_score(&self, last_n: usize) -> f64 {
        let n = self.episodes.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: u64 = self.episodes.iter().rev().take(n).map(|e| e.score).sum();
        sum as f64 / n as f64
    }

    /// Mean episode length over the last N episodes.
    pub fn average_moves(&self, last_n: usize) -> f64 {
        let n = self.episodes.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self.episodes.iter().rev().take(n).map(|e| e.moves).sum();
        total as f64 / n as f64
    }

    /// Highest score seen over the whole run.
    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }
}

impl Default for SearchMetrics {
    fn default() -> Self {
        Self::new()
    }
}
