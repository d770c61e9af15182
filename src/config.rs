use std::path::Path;

use crate::ai::InputEncoding;
use crate::error::ConfigError;

/// Board dimensions and spawn setup.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: usize,
    pub start_tiles: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            board_size: 4,
            start_tiles: 2,
        }
    }
}

/// Network topology and input encoding. The input layer is one node per
/// board cell and the output layer is one node per direction; only the
/// hidden layers are configurable.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub hidden_layers: Vec<usize>,
    pub input_encoding: InputEncoding,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            hidden_layers: vec![32],
            input_encoding: InputEncoding::LogScaled,
        }
    }
}

impl NetworkConfig {
    /// Full layer-size list for a board with `input_nodes` cells.
    pub fn layer_sizes(&self, input_nodes: usize) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(input_nodes);
        sizes.extend_from_slice(&self.hidden_layers);
        sizes.push(4);
        sizes
    }
}

/// Hill-climb schedule and perturbation parameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_iterations: usize,
    pub episodes_per_iteration: usize,
    pub perturbation_range: f64,
    /// How many consecutive illegal network choices are tolerated before
    /// the episode ends. 0 ends it on the first.
    pub invalid_move_tolerance: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_iterations: 100,
            episodes_per_iteration: 100,
            perturbation_range: 0.1,
            invalid_move_tolerance: 0,
        }
    }
}

/// Training-loop reporting cadence.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub log_interval: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig { log_interval: 100 }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub network: NetworkConfig,
    pub search: SearchConfig,
    pub training: TrainerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            eprintln!(
                "Warning: config file '{}' not found, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.board_size < 2 {
            return Err(ConfigError::Validation(
                "game.board_size must be >= 2".into(),
            ));
        }
        if self.game.start_tiles == 0 {
            return Err(ConfigError::Validation(
                "game.start_tiles must be >= 1".into(),
            ));
        }
        if self.game.start_tiles > self.game.board_size * self.game.board_size {
            return Err(ConfigError::Validation(
                "game.start_tiles must fit on the board".into(),
            ));
        }
        if self.network.hidden_layers.iter().any(|&n| n == 0) {
            return Err(ConfigError::Validation(
                "network.hidden_layers entries must be >= 1".into(),
            ));
        }
        if self.search.max_iterations == 0 {
            return Err(ConfigError::Validation(
                "search.max_iterations must be > 0".into(),
            ));
        }
        if self.search.episodes_per_iteration == 0 {
            return Err(ConfigError::Validation(
                "search.episodes_per_iteration must be > 0".into(),
            ));
        }
        if !self.search.perturbation_range.is_finite() || self.search.perturbation_range <= 0.0 {
            return Err(ConfigError::Validation(
                "search.perturbation_range must be > 0 and finite".into(),
            ));
        }
        if self.training.log_interval == 0 {
            return Err(ConfigError::Validation(
                "training.log_interval must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn test_default_topology_is_16_32_4() {
        let config = AppConfig::default();
        let input = config.game.board_size * config.game.board_size;
        assert_eq!(config.network.layer_sizes(input), vec![16, 32, 4]);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[network]
hidden_layers = [8]
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.network.hidden_layers, vec![8]);
        assert_eq!(config.network.layer_sizes(16), vec![16, 8, 4]);
        // Other fields should be defaults
        assert_eq!(config.search.max_iterations, 100);
        assert_eq!(config.game.board_size, 4);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.search.episodes_per_iteration, 100);
        assert_eq!(config.game.start_tiles, 2);
        assert_eq!(config.network.input_encoding, InputEncoding::LogScaled);
    }

    #[test]
    fn test_input_encoding_parses_snake_case() {
        let config: AppConfig = toml::from_str(
            r#"
[network]
input_encoding = "binary"
"#,
        )
        .unwrap();
        assert_eq!(config.network.input_encoding, InputEncoding::Binary);
    }

    #[test]
    fn test_validation_rejects_tiny_board() {
        let mut config = AppConfig::default();
        config.game.board_size = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_start_tiles() {
        let mut config = AppConfig::default();
        config.game.start_tiles = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_overfull_start() {
        let mut config = AppConfig::default();
        config.game.board_size = 2;
        config.game.start_tiles = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_width_hidden_layer() {
        let mut config = AppConfig::default();
        config.network.hidden_layers = vec![32, 0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_iterations() {
        let mut config = AppConfig::default();
        config.search.max_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_episodes() {
        let mut config = AppConfig::default();
        config.search.episodes_per_iteration = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_nonpositive_perturbation_range() {
        let mut config = AppConfig::default();
        config.search.perturbation_range = 0.0;
        assert!(config.validate().is_err());
        config.search.perturbation_range = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_log_interval() {
        let mut config = AppConfig::default();
        config.training.log_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.search.max_iterations, 100);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[search]
max_iterations = 5
episodes_per_iteration = 10
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.search.max_iterations, 5);
        assert_eq!(config.search.episodes_per_iteration, 10);
        // Others are defaults
        assert_eq!(config.game.board_size, 4);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_config.toml");
        std::fs::write(&path, "[search]\nmax_iterations = 0\n").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config
            .validate()
            .expect("roundtripped config should be valid");
    }
}
