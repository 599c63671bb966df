use super::layout::PersistedState;
use crate::{Result, WhispererError};
use parking_lot::RwLock;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Durable storage for the persisted part of the state
pub trait StateStorage: Send + Sync {
    /// Read the saved state, `Ok(None)` when nothing was saved yet
    fn load(&self) -> Result<Option<PersistedState>>;

    /// Overwrite the saved state
    fn save(&self, state: &PersistedState) -> Result<()>;

    /// Human readable location for logs
    fn location(&self) -> String;
}

/// JSON file on local disk
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/call-whisperer/state.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("call-whisperer").join("state.json"))
    }
}

impl StateStorage for FileStorage {
    fn load(&self) -> Result<Option<PersistedState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| {
            WhispererError::StorageError(format!("failed reading {}: {}", self.path.display(), e))
        })?;
        let state = PersistedState::from_json(&raw)?;
        debug!(path = %self.path.display(), "loaded saved state");
        Ok(Some(state))
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        let Some(parent) = self.path.parent() else {
            return Err(WhispererError::StorageError(format!(
                "state path {} has no parent",
                self.path.display()
            )));
        };
        fs::create_dir_all(parent)?;
        fs::write(&self.path, state.to_json()?)?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process storage holding the serialized JSON
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    raw: Arc<RwLock<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with raw JSON
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Arc::new(RwLock::new(Some(raw.into()))),
        }
    }

    /// The JSON last written, if any
    pub fn raw(&self) -> Option<String> {
        self.raw.read().clone()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PersistedState>> {
        match self.raw.read().as_deref() {
            Some(raw) => Ok(Some(PersistedState::from_json(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        *self.raw.write() = Some(state.to_json()?);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::types::TrainingData;

    #[test]
    fn test_file_storage_missing_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let storage = FileStorage::new(dir.path().join("state.json"));
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let storage = FileStorage::new(dir.path().join("nested").join("state.json"));

        let state = PersistedState {
            api_key: Some("sk-file".to_string()),
            training_data: vec![TrainingData::new("Be polite.")],
            ..Default::default()
        };
        storage.save(&state).unwrap();

        let loaded = storage.load().unwrap().expect("saved state");
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(path);
        let err = storage.load().unwrap_err();
        assert!(matches!(err, WhispererError::SerializationError(_)));
    }

    #[test]
    fn test_memory_storage_shares_clones() {
        let storage = MemoryStorage::new();
        let clone = storage.clone();
        assert!(storage.load().unwrap().is_none());

        clone.save(&PersistedState::default()).unwrap();
        assert!(storage.raw().is_some());
        assert_eq!(storage.load().unwrap(), Some(PersistedState::default()));
    }
}
