use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::learning::action::{ALL_ACTIONS, Action};
use crate::learning::q_table::QRow;

/// How much an action choice is allowed to explore.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Exploration {
    /// Never explore.
    Greedy,
    /// Explore with the given probability. Values `>= 1` always explore and
    /// values `<= 0` never do.
    Epsilon(f64),
}

/// Epsilon-greedy choice over the action-values of one state.
pub fn choose_action<R: Rng + ?Sized>(
    q_row: &QRow,
    exploration: Exploration,
    rng: &mut R,
) -> Action {
    match exploration {
        Exploration::Greedy => greedy_action(q_row),
        Exploration::Epsilon(epsilon) => {
            if epsilon > 0.0 && rng.random::<f64>() < epsilon {
                rng.random()
            } else {
                greedy_action(q_row)
            }
        }
    }
}

/// Argmax over `q_row`. Ties go to the lowest action index.
pub fn greedy_action(q_row: &QRow) -> Action {
    let mut best = 0;
    for (i, value) in q_row.iter().enumerate().skip(1) {
        if *value > q_row[best] {
            best = i;
        }
    }
    ALL_ACTIONS[best]
}
