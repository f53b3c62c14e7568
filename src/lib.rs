//! Tabular Q-learning on a square grid.
//!
//! An agent starts in the top-left cell and learns to reach the bottom-right
//! cell. Rewards grow as the agent gets closer to the goal, entering the goal
//! pays a large bonus and bumping into a wall costs more than any move.

pub mod config;
pub mod error;
pub mod grid;
pub mod learning;
pub mod storage;
pub mod trainer;

pub use config::{Config, TableInit};
pub use error::{Error, Result};
pub use grid::{Coordinate, GridEnvironment};
pub use learning::action::Action;
pub use learning::q_table::QTable;
pub use storage::{JsonFileStorage, MemoryStorage, Storage, StorageBackend};
pub use trainer::{EvaluationResult, Settings, TrainParams, Trainer, TrainingResult};
