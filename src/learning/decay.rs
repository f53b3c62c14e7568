use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Linear epsilon decay over the episode window `[start, end)`.
///
/// Epsilon is held before `start`, reduced by a fixed amount each episode
/// inside the window and pinned to zero from `end` onwards. The per-episode
/// amount is derived once from the initial epsilon, so the decay is linear in
/// the episode index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecaySchedule {
    start: usize,
    end: usize,
    rate: f64,
}

impl DecaySchedule {
    pub fn new(initial_epsilon: f64, start: usize, end: usize) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidConfig(format!(
                "decay window must be non-empty, got [{start}, {end})"
            )));
        }
        Ok(DecaySchedule {
            start,
            end,
            rate: initial_epsilon / (end - start) as f64,
        })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Epsilon to use for `episode` given the previous episode's epsilon.
    pub fn step(&self, current: f64, episode: usize) -> f64 {
        if episode < self.start {
            current
        } else if episode < self.end {
            (current - self.rate).max(0.0)
        } else {
            0.0
        }
    }

    pub fn into_fn(self) -> impl Fn(f64, usize) -> f64 {
        move |current, episode| self.step(current, episode)
    }
}
