use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::grid::Coordinate;

pub type Reward = f64;

/// Default bonus for entering the goal cell: the per-episode step cap (18)
/// times 13.
pub const DEFAULT_GOAL_REWARD: Reward = 18.0 * 13.0;

/// Per-cell rewards, indexed `[x][y]`, equal to the negative Euclidean
/// distance from the cell to the goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardField {
    field: Vec<Vec<Reward>>,
    goal_reward: Reward,
    wall_penalty: Reward,
}

impl RewardField {
    pub fn new(size: usize, goal: Coordinate, goal_reward: Reward) -> Self {
        let field = (0..size)
            .map(|x| {
                (0..size)
                    .map(|y| {
                        let dx = goal.x as f64 - x as f64;
                        let dy = goal.y as f64 - y as f64;
                        -dx.hypot(dy)
                    })
                    .collect_vec()
            })
            .collect_vec();

        // Strictly worse than any distance reward. With the goal in the far
        // corner the minimum is the start cell.
        let wall_penalty = field
            .iter()
            .flatten()
            .copied()
            .fold(f64::INFINITY, f64::min)
            - 1.0;

        RewardField {
            field,
            goal_reward,
            wall_penalty,
        }
    }

    pub fn at(&self, c: Coordinate) -> Reward {
        self.field[c.x][c.y]
    }

    pub fn goal_reward(&self) -> Reward {
        self.goal_reward
    }

    pub fn wall_penalty(&self) -> Reward {
        self.wall_penalty
    }

    pub fn values(&self) -> impl Iterator<Item = Reward> + '_ {
        self.field.iter().flatten().copied()
    }
}
