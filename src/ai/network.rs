use rand::Rng;

use crate::error::NetworkError;
use crate::game::Board;

/// How a board cell maps onto its input node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEncoding {
    /// log2(value) normalized by log2 of the board's current largest tile,
    /// a 0..1 scale relative to the biggest tile present.
    LogScaled,
    /// 1 for any occupied cell regardless of value. Changes learning
    /// dynamics; must be picked explicitly.
    Binary,
}

/// Logistic sigmoid rescaled to (-1, 1). Written in the odd form
/// sign(x)·(1 − e^−|x|)/(1 + e^−|x|) so large magnitudes saturate instead
/// of overflowing.
pub fn squash(x: f64) -> f64 {
    let e = (-x.abs()).exp();
    let magnitude = (1.0 - e) / (1.0 + e);
    if x < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

/// An immutable capture of every connection weight, grouped by layer in
/// connection-creation order, paired with the terminal score of the episode
/// that produced it.
#[derive(Debug, Clone)]
pub struct NetworkState {
    score: u64,
    weights: Vec<Vec<f64>>,
}

impl NetworkState {
    pub(crate) fn new(score: u64, weights: Vec<Vec<f64>>) -> Self {
        NetworkState { score, weights }
    }

    /// Capture the network's live weights together with an episode score.
    pub fn capture(network: &Network, score: u64) -> Self {
        NetworkState {
            score,
            weights: network.weights.clone(),
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    pub fn weight(&self, layer: usize, index: usize) -> f64 {
        self.weights[layer][index]
    }
}

/// One node for the rendering snapshot.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NodeSnapshot {
    pub layer: usize,
    pub position: usize,
    pub value: f64,
}

/// One connection for the rendering snapshot.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConnectionSnapshot {
    pub layer: usize,
    pub origin: usize,
    pub destination: usize,
    pub weight: f64,
}

/// Read-only view of the whole network for rendering.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NetworkSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub connections: Vec<ConnectionSnapshot>,
}

/// A fixed-topology, fully-connected feed-forward network. Input nodes are
/// bound 1:1 to board cells by flat index; the four output nodes are bound
/// to shift directions by position. Only weights ever change after
/// construction.
///
/// Weights are stored per layer pair, origin-major
/// (`weights[l][origin * next_size + destination]`), which is also the
/// order snapshots are keyed by.
#[derive(Debug, Clone)]
pub struct Network {
    layer_sizes: Vec<usize>,
    weights: Vec<Vec<f64>>,
    values: Vec<Vec<f64>>,
    encoding: InputEncoding,
}

impl Network {
    /// Build a network with uniformly random weights in (-1, 1).
    pub fn new<R: Rng>(layer_sizes: Vec<usize>, encoding: InputEncoding, rng: &mut R) -> Self {
        assert!(layer_sizes.len() >= 2, "network needs input and output layers");
        let mut weights = Vec::with_capacity(layer_sizes.len() - 1);
        for pair in layer_sizes.windows(2) {
            let count = pair[0] * pair[1];
            weights.push((0..count).map(|_| rng.random_range(-1.0..1.0)).collect());
        }
        let values = layer_sizes.iter().map(|&n| vec![0.0; n]).collect();
        Network {
            layer_sizes,
            weights,
            values,
            encoding,
        }
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn connection_count(&self) -> usize {
        self.weights.iter().map(Vec::len).sum()
    }

    pub(crate) fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    pub(crate) fn weights_mut(&mut self) -> &mut [Vec<f64>] {
        &mut self.weights
    }

    /// Read the board into the input layer and run one forward pass.
    /// Returns the raw linear scores of the four output nodes.
    pub fn evaluate(&mut self, board: &Board) -> &[f64] {
        debug_assert_eq!(
            self.layer_sizes[0],
            board.cell_count(),
            "input layer must match the board"
        );
        let inputs = self.encode(board);
        self.forward(&inputs)
    }

    /// Forward pass over explicit inputs: hidden layers are squashed,
    /// the output layer stays linear.
    pub fn forward(&mut self, inputs: &[f64]) -> &[f64] {
        debug_assert_eq!(inputs.len(), self.layer_sizes[0]);
        self.values[0].copy_from_slice(inputs);

        let last = self.layer_sizes.len() - 1;
        for layer in 1..=last {
            let prev_size = self.layer_sizes[layer - 1];
            let size = self.layer_sizes[layer];
            for dest in 0..size {
                let mut sum = 0.0;
                for origin in 0..prev_size {
                    sum += self.values[layer - 1][origin]
                        * self.weights[layer - 1][origin * size + dest];
                }
                self.values[layer][dest] = if layer < last { squash(sum) } else { sum };
            }
        }
        &self.values[last]
    }

    /// Map board cells onto input values per the configured encoding. An
    /// all-empty board yields all zeros; the logarithm is never evaluated
    /// on a value below 2.
    fn encode(&self, board: &Board) -> Vec<f64> {
        let max = board.max_tile_value();
        (0..board.cell_count())
            .map(|i| match board.value_at(i) {
                None => 0.0,
                Some(_) if max < 2 => 0.0,
                Some(v) => match self.encoding {
                    InputEncoding::Binary => 1.0,
                    InputEncoding::LogScaled => {
                        if max == 2 {
                            // log2(max) would be 1; values are all 2 here.
                            1.0
                        } else {
                            f64::from(v).log2() / f64::from(max).log2()
                        }
                    }
                },
            })
            .collect()
    }

    /// Overwrite every live weight from a snapshot. A shape mismatch means
    /// the topology changed mid-session, which is a fatal configuration
    /// error.
    pub fn restore(&mut self, state: &NetworkState) -> Result<(), NetworkError> {
        if state.weights.len() != self.weights.len() {
            return Err(NetworkError::LayerCountMismatch {
                snapshot: state.weights.len(),
                network: self.weights.len(),
            });
        }
        for (layer, (ours, theirs)) in self.weights.iter().zip(&state.weights).enumerate() {
            if ours.len() != theirs.len() {
                return Err(NetworkError::TopologyMismatch {
                    layer,
                    snapshot: theirs.len(),
                    network: ours.len(),
                });
            }
        }
        for (ours, theirs) in self.weights.iter_mut().zip(&state.weights) {
            ours.copy_from_slice(theirs);
        }
        Ok(())
    }

    /// Read-only snapshot for the rendering collaborator: every node with
    /// its last activation, every connection with its weight.
    pub fn snapshot(&self) -> NetworkSnapshot {
        let nodes = self
            .values
            .iter()
            .enumerate()
            .flat_map(|(layer, vals)| {
                vals.iter().enumerate().map(move |(position, &value)| NodeSnapshot {
                    layer,
                    position,
                    value,
                })
            })
            .collect();

        let mut connections = Vec::with_capacity(self.connection_count());
        for (layer, pair) in self.layer_sizes.windows(2).enumerate() {
            let next = pair[1];
            for (i, &weight) in self.weights[layer].iter().enumerate() {
                connections.push(ConnectionSnapshot {
                    layer,
                    origin: i / next,
                    destination: i % next,
                    weight,
                });
            }
        }

        NetworkSnapshot { nodes, connections }
    }
}
