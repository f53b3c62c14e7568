use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::Coordinate;
use crate::learning::action::{ACTIONS_COUNT, ALL_ACTIONS, Action};

pub type QRow = [f64; ACTIONS_COUNT];

/// The persisted form of a [`QTable`], indexed `[x][y][action]`.
pub type QTableSnapshot = Vec<Vec<QRow>>;

/// Action-value estimates for every `(x, y, action)` triple of a square grid.
///
/// The shape is fixed at construction; there is no resizing. Deserializing
/// goes through the same shape check as [`QTable::from_snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QTableSnapshot", into = "QTableSnapshot")]
pub struct QTable {
    size: usize,
    tab: Vec<Vec<QRow>>,
}

impl QTable {
    /// Build a table where each entry is produced by `fill`.
    pub fn initialize<F>(size: usize, mut fill: F) -> Self
    where
        F: FnMut(Coordinate, Action) -> f64,
    {
        let tab = (0..size)
            .map(|x| {
                (0..size)
                    .map(|y| ALL_ACTIONS.map(|a| fill(Coordinate::new(x, y), a)))
                    .collect_vec()
            })
            .collect_vec();
        QTable { size, tab }
    }

    pub fn zeros(size: usize) -> Self {
        Self::initialize(size, |_, _| 0.0)
    }

    /// Uniform `[0, 1)` seeding.
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        Self::initialize(size, |_, _| rng.random::<f64>())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, c: Coordinate) -> QRow {
        self.tab[c.x][c.y]
    }

    pub fn value(&self, c: Coordinate, action: Action) -> f64 {
        self.tab[c.x][c.y][action.index()]
    }

    pub fn max_value(&self, c: Coordinate) -> f64 {
        self.get(c).into_iter().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn update(&mut self, c: Coordinate, action: Action, value: f64) {
        self.tab[c.x][c.y][action.index()] = value;
    }

    pub fn to_snapshot(&self) -> QTableSnapshot {
        self.tab.clone()
    }

    /// Restore a table, rejecting snapshots whose shape is not
    /// `size x size x ACTIONS_COUNT`.
    pub fn from_snapshot(snapshot: QTableSnapshot, size: usize) -> Result<Self> {
        if snapshot.len() != size {
            return Err(Error::MalformedSnapshot(format!(
                "expected {size} columns, found {}",
                snapshot.len()
            )));
        }
        if let Some((x, column)) = snapshot.iter().find_position(|col| col.len() != size) {
            return Err(Error::MalformedSnapshot(format!(
                "column {x} has {} rows, expected {size}",
                column.len()
            )));
        }
        Ok(QTable {
            size,
            tab: snapshot,
        })
    }
}

impl TryFrom<QTableSnapshot> for QTable {
    type Error = Error;

    fn try_from(snapshot: QTableSnapshot) -> Result<Self> {
        let size = snapshot.len();
        QTable::from_snapshot(snapshot, size)
    }
}

impl From<QTable> for QTableSnapshot {
    fn from(q: QTable) -> Self {
        q.tab
    }
}
