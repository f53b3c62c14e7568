use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::learning::reward::{DEFAULT_GOAL_REWARD, Reward};

/// Overrides `storage.q_table_path` when set.
pub const Q_TABLE_PATH_ENV: &str = "GRIDQ_Q_TABLE_PATH";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub learning: LearningConfig,
    pub training: TrainingConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub size: usize,
    pub goal_reward: Reward,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            size: 10,
            goal_reward: DEFAULT_GOAL_REWARD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Learning rate.
    pub alpha: f64,
    /// Discount factor.
    pub gamma: f64,
    pub initial_epsilon: f64,
    pub decay_start: usize,
    pub decay_end: usize,
    pub init: TableInit,
}

/// How a Q-table is filled when storage holds none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableInit {
    #[default]
    Zeros,
    /// Uniform `[0, 1)` values.
    Random,
}

impl Default for LearningConfig {
    fn default() -> Self {
        LearningConfig {
            alpha: 0.1,
            gamma: 0.95,
            initial_epsilon: 1.0,
            decay_start: 500,
            decay_end: 1600,
            init: TableInit::Zeros,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub rounds: usize,
    pub max_iterations_per_round: usize,
    /// End an episode as soon as the goal is entered.
    pub stop_at_goal: bool,
    /// Emit a progress log line every this many episodes. Zero disables it.
    pub log_every: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            rounds: 2000,
            max_iterations_per_round: 18,
            stop_at_goal: false,
            log_every: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub q_table_path: Option<PathBuf>,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Applies environment overrides on top of the file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(path) = std::env::var_os(Q_TABLE_PATH_ENV).filter(|p| !p.is_empty()) {
            self.storage.q_table_path = Some(PathBuf::from(path));
        }
        self
    }

    /// The storage location is the one setting without a default.
    pub fn q_table_path(&self) -> Result<&Path> {
        self.storage
            .q_table_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(Error::ConfigurationMissing {
                key: "storage.q_table_path",
            })
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid.size == 0 {
            return Err(Error::InvalidConfig("grid.size must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.learning.alpha) {
            return Err(Error::InvalidConfig(format!(
                "learning.alpha must be in [0, 1], got {}",
                self.learning.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.learning.gamma) {
            return Err(Error::InvalidConfig(format!(
                "learning.gamma must be in [0, 1], got {}",
                self.learning.gamma
            )));
        }
        if self.learning.decay_start >= self.learning.decay_end {
            return Err(Error::InvalidConfig(format!(
                "learning.decay_start ({}) must be below learning.decay_end ({})",
                self.learning.decay_start, self.learning.decay_end
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization_toml() {
        let mut config = Config::default();
        config.storage.q_table_path = Some(PathBuf::from("data/q.json"));
        let serialized = toml::to_string(&config).unwrap();

        let deserialized = Config::from_toml_str(&serialized).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_defaults_from_empty_file() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.grid.size, 10);
        assert_eq!(config.grid.goal_reward, 234.0);
        assert_eq!(config.learning.alpha, 0.1);
        assert_eq!(config.learning.gamma, 0.95);
        assert_eq!(config.training.rounds, 2000);
        assert_eq!(config.training.max_iterations_per_round, 18);
        assert!(!config.training.stop_at_goal);
    }

    #[test]
    fn test_missing_storage_path() {
        let config = Config::from_toml_str("[grid]\nsize = 5\n").unwrap();
        assert!(matches!(
            config.q_table_path(),
            Err(Error::ConfigurationMissing {
                key: "storage.q_table_path"
            })
        ));

        let config = Config::from_toml_str("[storage]\nq_table_path = \"q.json\"\n").unwrap();
        assert_eq!(config.q_table_path().unwrap(), Path::new("q.json"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_toml_str("[grid]\nsize = 0\n").is_err());
        assert!(Config::from_toml_str("[learning]\nalpha = 1.5\n").is_err());
        assert!(Config::from_toml_str("[learning]\ndecay_start = 10\ndecay_end = 10\n").is_err());
        assert!(Config::from_toml_str("[grid]\nsize = \"ten\"\n").is_err());
    }

    #[test]
    fn test_table_init_parsing() {
        let config = Config::from_toml_str("[learning]\ninit = \"random\"\n").unwrap();
        assert_eq!(config.learning.init, TableInit::Random);
        assert_eq!(Config::default().learning.init, TableInit::Zeros);
        assert!(Config::from_toml_str("[learning]\ninit = \"ones\"\n").is_err());
    }

    #[test]
    fn test_env_overrides_q_table_path() {
        let base = Config::from_toml_str("[storage]\nq_table_path = \"from-file.json\"\n").unwrap();

        // Edition 2024 marks these unsafe; no other test reads this variable.
        unsafe { std::env::set_var(Q_TABLE_PATH_ENV, "from-env.json") };
        let overridden = base.clone().with_env_overrides();
        unsafe { std::env::set_var(Q_TABLE_PATH_ENV, "") };
        let empty = base.clone().with_env_overrides();
        unsafe { std::env::remove_var(Q_TABLE_PATH_ENV) };
        let unset = base.with_env_overrides();

        assert_eq!(overridden.q_table_path().unwrap(), Path::new("from-env.json"));
        assert_eq!(empty.q_table_path().unwrap(), Path::new("from-file.json"));
        assert_eq!(unset.q_table_path().unwrap(), Path::new("from-file.json"));

        let missing = Config::default();
        unsafe { std::env::set_var(Q_TABLE_PATH_ENV, "only-env.json") };
        let filled = missing.with_env_overrides();
        unsafe { std::env::remove_var(Q_TABLE_PATH_ENV) };
        assert_eq!(filled.q_table_path().unwrap(), Path::new("only-env.json"));
    }

    #[test]
    fn test_read_from_file() {
        let config = Config::from_file("./gridq.toml").expect("Failed to read the file");
        assert!(config.q_table_path().is_ok());
    }
}
