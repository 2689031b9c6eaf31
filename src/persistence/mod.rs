// Persistence module - the durable state blob
//
// The store's persisted half (config + session list + active index) is kept
// as a single JSON document:
//
//   {"config": {...}, "sessions": [...], "activeIndex": 0}
//
// Loading never fails: a missing file means first run, an unreadable or
// corrupt file is logged and replaced by defaults on the next write.
// Writing happens in a background task that subscribes to store snapshots.

mod writer;

pub use writer::PersistenceWriter;

use crate::model::{Session, ShellConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Serialized form of the store's durable state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub config: ShellConfig,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub active_index: usize,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            config: ShellConfig::default(),
            sessions: vec![Session::new()],
            active_index: 0,
        }
    }
}

/// Durable storage failures; always recovered locally
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("state storage unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("state blob is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Where the state blob lives
pub trait StateStorage: Send {
    /// `Ok(None)` when nothing has been stored yet
    fn load(&self) -> Result<Option<PersistedState>, PersistenceError>;

    fn save(&mut self, state: &PersistedState) -> Result<(), PersistenceError>;

    /// Short description for log lines
    fn describe(&self) -> String;
}

/// JSON file on disk, replaced atomically on every save
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Unavailable {
            path: self.path.clone(),
            source,
        }
    }
}

impl StateStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<PersistedState>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.unavailable(e)),
        }
    }

    fn save(&mut self, state: &PersistedState) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.unavailable(e))?;
        }

        // Write-then-rename so a crash mid-write never leaves a torn blob
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.unavailable(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.unavailable(e))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory storage holding the raw serialized blob
///
/// Clones share the same slot, so a test can keep one handle while the
/// writer task owns another.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryStorage {
    blob: Arc<Mutex<Option<String>>>,
    saves: Arc<Mutex<usize>>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with raw text (possibly invalid JSON)
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let storage = Self::default();
        *storage.blob.lock().unwrap_or_else(|e| e.into_inner()) = Some(raw.into());
        storage
    }

    pub fn raw(&self) -> Option<String> {
        self.blob.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
impl StateStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PersistedState>, PersistenceError> {
        match self.raw() {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, state: &PersistedState) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(state)?;
        *self.blob.lock().unwrap_or_else(|e| e.into_inner()) = Some(json);
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Load the blob, falling back to defaults on absence or failure
pub fn load_or_default(storage: &dyn StateStorage) -> PersistedState {
    match storage.load() {
        Ok(Some(state)) => {
            tracing::info!(
                "Restored {} session(s) from {}",
                state.sessions.len(),
                storage.describe()
            );
            state
        }
        Ok(None) => {
            tracing::info!("No saved state at {}, starting fresh", storage.describe());
            PersistedState::default()
        }
        Err(e) => {
            tracing::warn!("Falling back to default state: {}", e);
            PersistedState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Message, Theme};

    #[test]
    fn blob_uses_documented_schema() {
        let state = PersistedState::default();
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("config").is_some());
        assert!(json.get("sessions").unwrap().is_array());
        assert_eq!(json.get("activeIndex").unwrap(), 0);
        assert_eq!(json["config"]["sidebarWidth"], 300.0);
        assert_eq!(json["config"]["theme"], "auto");
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonFileStorage::new(dir.path().join("nested").join("state.json"));
        assert!(storage.load().unwrap().is_none());

        let mut state = PersistedState::default();
        state.config.theme = Theme::Dark;
        state.sessions[0].messages.push(Message::user("persist me"));
        storage.save(&state).unwrap();

        let loaded = storage.load().unwrap().unwrap();
        assert_eq!(loaded, state);
        assert!(!storage.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_blob_falls_back_to_defaults() {
        let storage = MemoryStorage::with_raw("{ not json");
        assert!(matches!(storage.load(), Err(PersistenceError::Corrupt(_))));

        let state = load_or_default(&storage);
        assert_eq!(state.sessions.len(), 1);
        assert!(state.sessions[0].is_empty());
        assert_eq!(state.config, ShellConfig::default());
    }

    #[test]
    fn missing_blob_falls_back_to_defaults() {
        let state = load_or_default(&MemoryStorage::new());
        assert_eq!(state.sessions.len(), 1);
        assert_eq!(state.active_index, 0);
    }

    #[test]
    fn partial_blob_fills_defaults() {
        let storage = MemoryStorage::with_raw(r#"{"config":{"sidebarWidth":700}}"#);
        let state = load_or_default(&storage);
        // Raw value survives decoding; the store applies the clamp on restore
        assert_eq!(state.config.sidebar_width, 700.0);
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn unreadable_path_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes read_to_string fail
        let storage = JsonFileStorage::new(dir.path());
        assert!(matches!(
            storage.load(),
            Err(PersistenceError::Unavailable { .. })
        ));

        let state = load_or_default(&storage);
        assert_eq!(state.config, ShellConfig::default());
        assert_eq!(state.sessions.len(), 1);
    }
}
