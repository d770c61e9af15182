use std::fmt;

use rand::Rng;

use crate::ai::{squash, Network, NetworkState};
use crate::config::SearchConfig;
use crate::error::NetworkError;

/// Text emitted on each iteration advance for the score-log collaborator:
/// the iteration index and best score on one line, then the best state's
/// weights grouped by layer in connection-creation order.
#[derive(Debug, Clone)]
pub struct IterationReport {
    pub iteration: usize,
    pub best_score: u64,
    pub weights: Vec<Vec<f64>>,
}

impl fmt::Display for IterationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.iteration, self.best_score)?;
        for (layer, weights) in self.weights.iter().enumerate() {
            write!(f, "\n{}", layer)?;
            for (index, weight) in weights.iter().enumerate() {
                write!(f, "`{}:{}", index, weight)?;
            }
        }
        Ok(())
    }
}

/// The elitist hill-climb over connection weights.
///
/// Episodes are collected into fixed-size batches ("iterations"). Within a
/// batch every episode perturbs around the best configuration ever seen;
/// when a batch completes, the best snapshot in it challenges the global
/// best, the winner is written back into the live network, and the next
/// iteration begins. The global best score never decreases.
#[derive(Debug)]
pub struct WeightSearch {
    max_iterations: usize,
    episodes_per_iteration: usize,
    perturbation_range: f64,
    iteration: usize,
    batch: Vec<NetworkState>,
    global_best: Option<NetworkState>,
    done: bool,
}

impl WeightSearch {
    pub fn new(config: &SearchConfig) -> Self {
        WeightSearch {
            max_iterations: config.max_iterations,
            episodes_per_iteration: config.episodes_per_iteration,
            perturbation_range: config.perturbation_range,
            iteration: 0,
            batch: Vec::with_capacity(config.episodes_per_iteration),
            global_best: None,
            done: false,
        }
    }

    /// Iteration currently being collected.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Episodes recorded so far in the active iteration.
    pub fn episodes_in_batch(&self) -> usize {
        self.batch.len()
    }

    /// True once the configured number of iterations has completed; no
    /// further weight changes happen after that.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn global_best(&self) -> Option<&NetworkState> {
        self.global_best.as_ref()
    }

    pub fn best_score(&self) -> Option<u64> {
        self.global_best.as_ref().map(NetworkState::score)
    }

    /// Record a finished episode and prepare the network for the next one.
    /// Returns a report when this episode completed an iteration.
    pub fn record_episode<R: Rng>(
        &mut self,
        network: &mut Network,
        score: u64,
        rng: &mut R,
    ) -> Result<Option<IterationReport>, NetworkError> {
        if self.done {
            return Ok(None);
        }

        self.batch.push(NetworkState::capture(network, score));

        if self.batch.len() < self.episodes_per_iteration {
            self.perturb(network, rng);
            return Ok(None);
        }
        self.advance(network).map(Some)
    }

    /// Batch complete: pick the batch's best, keep whichever of it and the
    /// global best scored higher, and write that state's weights back into
    /// the live network.
    fn advance(&mut self, network: &mut Network) -> Result<IterationReport, NetworkError> {
        let mut best_index = 0;
        for (i, state) in self.batch.iter().enumerate() {
            if state.score() > self.batch[best_index].score() {
                best_index = i;
            }
        }
        let batch_best = self.batch.swap_remove(best_index);

        // A tie goes to the newer state, so exploration can drift across
        // equally scoring plateaus.
        let best = match self.global_best.take() {
            Some(prev) if prev.score() > batch_best.score() => prev,
            _ => batch_best,
        };

        network.restore(&best)?;

        let report = IterationReport {
            iteration: self.iteration,
            best_score: best.score(),
            weights: best.weights().to_vec(),
        };

        self.global_best = Some(best);
        self.batch.clear();
        self.iteration += 1;
        if self.iteration >= self.max_iterations {
            self.done = true;
        }
        Ok(report)
    }

    /// Random step for the next episode. Once a global best exists, every
    /// weight explores a neighborhood of it; until then (the whole first
    /// iteration) each weight random-walks around its own value, re-squashed
    /// to stay bounded.
    fn perturb<R: Rng>(&self, network: &mut Network, rng: &mut R) {
        let range = self.perturbation_range;
        match &self.global_best {
            Some(best) => {
                for (layer, weights) in network.weights_mut().iter_mut().enumerate() {
                    for (index, weight) in weights.iter_mut().enumerate() {
                        let delta = rng.random_range(-range..range);
                        *weight = best.weight(layer, index) + delta;
                    }
                }
            }
            None => {
                for weights in network.weights_mut() {
                    for weight in weights.iter_mut() {
                        let delta = rng.random_range(-range..range);
                        *weight = squash(*weight + delta);
                    }
                }
            }
        }
    }
}
