/// Errors that can occur while driving the game board.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    #[error("direction index {0} out of range (expected 0..4)")]
    InvalidDirection(usize),

    #[error("cannot spawn a tile: board is full")]
    BoardFull,
}

/// Errors that can occur in the network or the weight search.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NetworkError {
    #[error(
        "snapshot layer {layer} holds {snapshot} weights but the network has {network}; \
         topology changed mid-session"
    )]
    TopologyMismatch {
        layer: usize,
        snapshot: usize,
        network: usize,
    },

    #[error("snapshot has {snapshot} connection layers but the network has {network}")]
    LayerCountMismatch { snapshot: usize, network: usize },
}

/// Errors surfaced while driving a session or the training loop.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("game error: {0}")]
    Game(#[from] GameError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
