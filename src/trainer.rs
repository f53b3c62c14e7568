use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::config::{Config, TableInit};
use crate::error::{Error, Result};
use crate::grid::{Coordinate, GridEnvironment};
use crate::learning::action::Action;
use crate::learning::decay::DecaySchedule;
use crate::learning::policy::{Exploration, choose_action, greedy_action};
use crate::learning::q_table::QTable;
use crate::learning::reward::Reward;
use crate::storage::{Storage, StorageBackend};

pub type Trajectory = Vec<Coordinate>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    pub decay_epsilon: bool,
    /// Falls back to the configured number of rounds.
    pub rounds: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResult {
    pub max_rewards: Reward,
    pub states: Vec<Trajectory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub rewards: Reward,
    pub states: Trajectory,
}

/// Handed to the observer after every training episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeReport {
    pub episode: usize,
    pub epsilon: f64,
    pub reward: Reward,
    pub max_reward: Reward,
}

pub type EpisodeObserver = Box<dyn FnMut(&EpisodeReport)>;

/// Logs a progress line every `every` episodes.
pub fn log_progress(every: usize) -> EpisodeObserver {
    Box::new(move |report: &EpisodeReport| {
        if every > 0 && (report.episode + 1) % every == 0 {
            info!(
                "Episode: {:5} | Epsilon: {:.3} | Reward: {:8.2} | Max reward: {:8.2}",
                report.episode + 1,
                report.epsilon,
                report.reward,
                report.max_reward
            );
        }
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub grid_size: usize,
    pub goal_reward: Reward,
    pub alpha: f64,
    pub gamma: f64,
    pub initial_epsilon: f64,
    pub decay_start: usize,
    pub decay_end: usize,
    pub rounds: usize,
    pub max_iterations_per_round: usize,
    pub stop_at_goal: bool,
    /// Fill used when storage holds no table.
    pub init: TableInit,
}

impl Settings {
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Settings {
            grid_size: config.grid.size,
            goal_reward: config.grid.goal_reward,
            alpha: config.learning.alpha,
            gamma: config.learning.gamma,
            initial_epsilon: config.learning.initial_epsilon,
            decay_start: config.learning.decay_start,
            decay_end: config.learning.decay_end,
            rounds: config.training.rounds,
            max_iterations_per_round: config.training.max_iterations_per_round,
            stop_at_goal: config.training.stop_at_goal,
            init: config.learning.init,
        })
    }

    /// The decay rate follows whatever `initial_epsilon` currently holds.
    pub fn decay_schedule(&self) -> Result<DecaySchedule> {
        DecaySchedule::new(self.initial_epsilon, self.decay_start, self.decay_end)
    }
}

impl Default for Settings {
    fn default() -> Self {
        let Config {
            grid,
            learning,
            training,
            ..
        } = Config::default();
        Settings {
            grid_size: grid.size,
            goal_reward: grid.goal_reward,
            alpha: learning.alpha,
            gamma: learning.gamma,
            initial_epsilon: learning.initial_epsilon,
            decay_start: learning.decay_start,
            decay_end: learning.decay_end,
            rounds: training.rounds,
            max_iterations_per_round: training.max_iterations_per_round,
            stop_at_goal: training.stop_at_goal,
            init: learning.init,
        }
    }
}

struct Episode {
    rewards: Reward,
    states: Trajectory,
}

/// Owns the Q-table and runs training and evaluation episodes against it.
pub struct Trainer {
    settings: Settings,
    env: GridEnvironment,
    q_table: QTable,
    storage: StorageBackend,
    rng: StdRng,
    observer: Option<EpisodeObserver>,
}

impl Trainer {
    /// Fails when `q_table` was built for a different grid size.
    pub fn new(
        settings: Settings,
        q_table: QTable,
        storage: impl Into<StorageBackend>,
    ) -> Result<Self> {
        if q_table.size() != settings.grid_size {
            return Err(Error::MalformedSnapshot(format!(
                "table is {0}x{0} but the grid is {1}x{1}",
                q_table.size(),
                settings.grid_size
            )));
        }
        Ok(Trainer {
            env: GridEnvironment::new(settings.grid_size, settings.goal_reward),
            settings,
            q_table,
            storage: storage.into(),
            rng: StdRng::from_os_rng(),
            observer: None,
        })
    }

    /// Restore the Q-table from `storage`, filling a fresh one per
    /// `settings.init` when nothing is stored. Unreadable or malformed state
    /// is returned as an error.
    pub fn from_storage(settings: Settings, storage: impl Into<StorageBackend>) -> Result<Self> {
        let storage = storage.into();
        let q_table = match storage.load()? {
            Some(snapshot) => QTable::from_snapshot(snapshot, settings.grid_size)?,
            None => match settings.init {
                TableInit::Zeros => QTable::zeros(settings.grid_size),
                TableInit::Random => QTable::random(settings.grid_size, &mut rand::rng()),
            },
        };
        Self::new(settings, q_table, storage)
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_observer(mut self, observer: EpisodeObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn environment(&self) -> &GridEnvironment {
        &self.env
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn storage(&self) -> &StorageBackend {
        &self.storage
    }

    /// Run `params.rounds` learning episodes and persist the Q-table.
    ///
    /// If the final write fails the error is returned and the learned values
    /// stay in memory; [`Trainer::persist`] can be called again.
    pub fn train(&mut self, params: TrainParams) -> Result<TrainingResult> {
        let rounds = params.rounds.unwrap_or(self.settings.rounds);
        let decay = self.settings.decay_schedule()?.into_fn();
        let mut epsilon = self.settings.initial_epsilon;
        let mut max_rewards = f64::NEG_INFINITY;
        let mut states = Vec::with_capacity(rounds);

        info!(
            "Training for {rounds} rounds (decay epsilon: {})",
            params.decay_epsilon
        );
        for episode in 0..rounds {
            if params.decay_epsilon {
                epsilon = decay(epsilon, episode);
            }
            let Episode {
                rewards,
                states: trajectory,
            } = self.run_training_episode(Exploration::Epsilon(epsilon));
            max_rewards = max_rewards.max(rewards);
            states.push(trajectory);

            if let Some(observer) = self.observer.as_mut() {
                observer(&EpisodeReport {
                    episode,
                    epsilon,
                    reward: rewards,
                    max_reward: max_rewards,
                });
            }
        }

        self.persist()?;
        info!("Training finished, max reward {max_rewards:.2}");
        Ok(TrainingResult {
            max_rewards,
            states,
        })
    }

    /// One greedy episode. The Q-table is left untouched and nothing is
    /// persisted, so repeated calls give the same result.
    pub fn best_states(&self) -> EvaluationResult {
        let mut c = self.env.start();
        let mut rewards = 0.0;
        let mut states = vec![c];
        for _ in 0..self.settings.max_iterations_per_round {
            let action = greedy_action(&self.q_table.get(c));
            let (next, r) = self.env.transition(c, action);
            rewards += r;
            c = next;
            states.push(c);
            if self.settings.stop_at_goal && self.env.is_goal(c) {
                break;
            }
        }
        EvaluationResult { rewards, states }
    }

    pub fn persist(&self) -> Result<()> {
        self.storage.save(&self.q_table.to_snapshot())
    }

    fn run_training_episode(&mut self, exploration: Exploration) -> Episode {
        let mut c = self.env.start();
        let mut rewards = 0.0;
        let mut states = vec![c];
        for _ in 0..self.settings.max_iterations_per_round {
            let action = choose_action(&self.q_table.get(c), exploration, &mut self.rng);
            let (next, r) = self.env.transition(c, action);
            self.learn(c, action, next, r);
            rewards += r;
            c = next;
            states.push(c);
            if self.settings.stop_at_goal && self.env.is_goal(c) {
                debug!("Reached goal after {} steps", states.len() - 1);
                break;
            }
        }
        Episode { rewards, states }
    }

    fn learn(&mut self, c: Coordinate, action: Action, next: Coordinate, reward: Reward) {
        let current = self.q_table.value(c, action);
        let best_next = self.q_table.max_value(next);
        let target = reward + self.settings.gamma * best_next;
        self.q_table
            .update(c, action, current + self.settings.alpha * (target - current));
    }
}
