use serde::{Deserialize, Serialize};

use crate::learning::action::{ACTIONS_COUNT, Action};
use crate::learning::reward::{Reward, RewardField};

/// A cell on the grid. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl Coordinate {
    pub const fn new(x: usize, y: usize) -> Self {
        Coordinate { x, y }
    }
}

impl From<(usize, usize)> for Coordinate {
    fn from((x, y): (usize, usize)) -> Self {
        Coordinate { x, y }
    }
}

impl From<Coordinate> for (usize, usize) {
    fn from(c: Coordinate) -> Self {
        (c.x, c.y)
    }
}

type Transform = fn(Coordinate, usize) -> Coordinate;

fn left(c: Coordinate, _size: usize) -> Coordinate {
    Coordinate::new(c.x.saturating_sub(1), c.y)
}

fn right(c: Coordinate, size: usize) -> Coordinate {
    Coordinate::new(if c.x + 1 < size { c.x + 1 } else { c.x }, c.y)
}

fn down(c: Coordinate, size: usize) -> Coordinate {
    Coordinate::new(c.x, if c.y + 1 < size { c.y + 1 } else { c.y })
}

fn up(c: Coordinate, _size: usize) -> Coordinate {
    Coordinate::new(c.x, c.y.saturating_sub(1))
}

// Indexed by action ordinal. A move that would leave the grid returns the input.
const TRANSFORMS: [Transform; ACTIONS_COUNT] = [left, right, down, up];

/// Square grid with the agent starting at `(0, 0)` and the goal at
/// `(size - 1, size - 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridEnvironment {
    size: usize,
    goal: Coordinate,
    rewards: RewardField,
}

impl GridEnvironment {
    /// Panics if `size` is zero. [`crate::config::Config::validate`] rejects
    /// that before an environment is ever built.
    pub fn new(size: usize, goal_reward: Reward) -> Self {
        assert!(size > 0, "grid size must be positive");
        let goal = Coordinate::new(size - 1, size - 1);
        GridEnvironment {
            size,
            goal,
            rewards: RewardField::new(size, goal, goal_reward),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn start(&self) -> Coordinate {
        Coordinate::new(0, 0)
    }

    pub fn goal(&self) -> Coordinate {
        self.goal
    }

    pub fn reward_field(&self) -> &RewardField {
        &self.rewards
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        c.x < self.size && c.y < self.size
    }

    pub fn is_goal(&self, c: Coordinate) -> bool {
        c == self.goal
    }

    /// Move one cell in the direction of `action`, or stay put if that would
    /// leave the grid.
    pub fn step(&self, action: Action, c: Coordinate) -> Coordinate {
        debug_assert!(self.contains(c), "{c:?} is outside the grid");
        TRANSFORMS[action.index()](c, self.size)
    }

    /// Reward for moving from `prev` to `next`.
    ///
    /// The wall-hit check runs before the goal check, so an agent that fails
    /// to move is penalised even when it is standing on the goal.
    pub fn reward(&self, prev: Coordinate, next: Coordinate) -> Reward {
        if prev == next {
            return self.rewards.wall_penalty();
        }
        if self.is_goal(next) {
            return self.rewards.goal_reward();
        }
        self.rewards.at(next)
    }

    pub fn transition(&self, c: Coordinate, action: Action) -> (Coordinate, Reward) {
        let next = self.step(action, c);
        (next, self.reward(c, next))
    }
}
