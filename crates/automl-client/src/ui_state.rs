//! File-backed store for [`UiState`].
//!
//! Loaded once at start and saved once at exit. The state only restores
//! context, so an unreadable file is replaced by an empty state rather than
//! failing the run.

use automl_types::{StorageError, UiState};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

const UI_STATE_FILE: &str = "ui_state.json";

#[derive(Debug, Clone)]
pub struct UiStateStore {
    path: PathBuf,
}

impl UiStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/ui_state.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(UI_STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file → empty state; corrupt file → warning and empty state.
    pub fn load(&self) -> Result<UiState, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(UiState::default()),
            Err(e) => return Err(StorageError::read(&self.path, &e)),
        };

        match serde_json::from_str(&content) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!("Discarding unreadable UI state {}: {}", self.path.display(), e);
                Ok(UiState::default())
            },
        }
    }

    /// Writes the state atomically (temp file + rename).
    pub fn save(&self, state: &UiState) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::write(parent, &e))?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        let content =
            serde_json::to_string_pretty(state).map_err(|e| StorageError::parse(&self.path, &e))?;

        fs::write(&temp_path, content).map_err(|e| StorageError::write(&temp_path, &e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| StorageError::write(&self.path, &e))
    }

    /// Load, apply `updater`, save.
    pub fn update<F>(&self, updater: F) -> Result<UiState, StorageError>
    where
        F: FnOnce(&mut UiState),
    {
        let mut state = self.load()?;
        updater(&mut state);
        self.save(&state)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use automl_types::{DatasetSnapshot, ResourceId, TaskType, TrainRequest};

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = UiStateStore::in_dir(dir.path());
        assert_eq!(store.load().unwrap(), UiState::default());
    }

    #[test]
    fn state_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = UiStateStore::in_dir(dir.path());

        let saved = store
            .update(|s| {
                s.last_model_id = Some(ResourceId::from(12));
                s.last_path = Some("predict".to_string());
                s.last_dataset =
                    Some(DatasetSnapshot { id: ResourceId::from(3), name: "iris".to_string() });
                s.remember_training(&TrainRequest {
                    dataset_id: ResourceId::from(3),
                    target_column: "species".to_string(),
                    task_type: TaskType::Classification,
                    features: vec![],
                    algorithm: "knn".to_string(),
                });
            })
            .unwrap();

        assert_eq!(store.load().unwrap(), saved);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_replaced_by_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = UiStateStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load().unwrap(), UiState::default());
    }
}
