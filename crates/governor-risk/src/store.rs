//! Whole-file JSON persistence for governor state.

use std::fs;
use std::path::{Path, PathBuf};

use governor_core::error::GovernorError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Persists a state object as a single JSON file.
///
/// Writes are whole-file rewrites after each mutation; a crash between
/// computing new state and persisting it loses that one update rather
/// than corrupting partial state.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load state, falling back to the default on a missing or corrupt
    /// file. The governor must always be able to answer queries, even on
    /// first run or after a partial write.
    pub fn load<T: DeserializeOwned + Default>(&self) -> T {
        match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(state) => state,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "corrupt state file, starting fresh");
                    T::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => T::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable state file, starting fresh");
                T::default()
            }
        }
    }

    /// Persist state as a whole-file rewrite.
    ///
    /// Unlike read failures, write failures propagate; the caller decides
    /// whether to retry or continue with in-memory state for the cycle.
    pub fn save<T: Serialize>(&self, state: &T) -> Result<(), GovernorError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| GovernorError::StatePersistence {
                    path: self.path.display().to_string(),
                    source,
                })?;
            }
        }

        let raw = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, raw).map_err(|source| GovernorError::StatePersistence {
            path: self.path.display().to_string(),
            source,
        })
    }
}
