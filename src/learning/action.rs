use rand::Rng;
use rand::distr::Distribution;
use rand::distr::StandardUniform as Standard;
use serde::{Deserialize, Serialize};
use strum::EnumCount;
use strum_macros::{EnumCount, EnumIter};

/// A move on the grid. The discriminant is the action's slot in a Q-table row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumCount,
)]
pub enum Action {
    Left = 0,
    Right = 1,
    Down = 2,
    Up = 3,
}

pub const ACTIONS_COUNT: usize = Action::COUNT;

/// Actions in ordinal order.
pub const ALL_ACTIONS: [Action; ACTIONS_COUNT] =
    [Action::Left, Action::Right, Action::Down, Action::Up];

impl Action {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        ALL_ACTIONS.get(index).copied()
    }
}

impl Distribution<Action> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Action {
        ALL_ACTIONS[rng.random_range(0..ACTIONS_COUNT)]
    }
}
