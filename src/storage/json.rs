//! JSON file implementation of the progress store

use crate::state::ProgressState;
use crate::storage::traits::{ProgressStore, StorageError, StorageResult};
use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Progress store backed by a human-readable JSON file
///
/// Writes go to a sibling temporary file which is then renamed over the
/// checkpoint, so the file on disk is always a complete snapshot.
#[derive(Debug, Clone)]
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "progress".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl ProgressStore for JsonProgressStore {
    fn load(&self) -> ProgressState {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    "No progress file at {}, starting fresh",
                    self.path.display()
                );
                return ProgressState::new();
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to read progress file {}: {}, starting fresh",
                    self.path.display(),
                    e
                );
                return ProgressState::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    "Progress file {} is corrupt ({}), starting fresh",
                    self.path.display(),
                    e
                );
                ProgressState::new()
            }
        }
    }

    fn save(&self, state: &mut ProgressState) -> StorageResult<()> {
        state.last_run = Some(Utc::now());
        let json = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let temp = self.temp_path();
        let mut file = fs::File::create(&temp).map_err(|e| self.io_error(e))?;
        file.write_all(json.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| self.io_error(e))?;
        fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))?;

        Ok(())
    }

    fn reset(&self) -> StorageResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
