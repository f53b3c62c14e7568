use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required configuration value was not supplied.
    #[error("missing required configuration value `{key}`")]
    ConfigurationMissing { key: &'static str },

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read Q-table from {path}: {source}")]
    StorageRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Raised at the end of a training run. No retry is attempted.
    #[error("failed to write Q-table to {path}: {source}")]
    StorageWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed Q-table snapshot: {0}")]
    MalformedSnapshot(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
