use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use enum_dispatch::enum_dispatch;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::learning::q_table::QTableSnapshot;

/// Durable home of a Q-table snapshot.
#[enum_dispatch]
pub trait Storage {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<QTableSnapshot>>;
    fn save(&self, snapshot: &QTableSnapshot) -> Result<()>;
}

#[enum_dispatch(Storage)]
#[derive(Debug)]
pub enum StorageBackend {
    JsonFileStorage,
    MemoryStorage,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    q_table: Option<QTableSnapshot>,
}

/// Stores the snapshot as `{"q_table": [[[..]]]}` in a JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStorage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file that is written first and then renamed over `path`.
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Option<QTableSnapshot>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No Q-table at {}, starting fresh", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(Error::StorageRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let state: StoredState = serde_json::from_str(&contents)
            .map_err(|e| Error::MalformedSnapshot(format!("{}: {e}", self.path.display())))?;
        if state.q_table.is_none() {
            info!("{} has no q_table entry, starting fresh", self.path.display());
        }
        Ok(state.q_table)
    }

    fn save(&self, snapshot: &QTableSnapshot) -> Result<()> {
        let write_err = |source: std::io::Error| Error::StorageWrite {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let state = StoredState {
            q_table: Some(snapshot.clone()),
        };
        // A crash mid-write leaves the previous file intact.
        let staging = self.staging_path();
        fs::write(&staging, serde_json::to_string(&state)?).map_err(write_err)?;
        fs::rename(&staging, &self.path).map_err(write_err)?;
        debug!("Wrote Q-table to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the snapshot in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    snapshot: RefCell<Option<QTableSnapshot>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: QTableSnapshot) -> Self {
        MemoryStorage {
            snapshot: RefCell::new(Some(snapshot)),
        }
    }

    pub fn snapshot(&self) -> Option<QTableSnapshot> {
        self.snapshot.borrow().clone()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Option<QTableSnapshot>> {
        Ok(self.snapshot())
    }

    fn save(&self, snapshot: &QTableSnapshot) -> Result<()> {
        *self.snapshot.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }
}
