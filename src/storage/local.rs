//! Local filesystem state store.
//!
//! Keeps the last-seen document in a single JSON file (`lasts.json` by
//! default). Writes go to a temporary sibling first and are renamed over
//! the target, so a reader sees either the old or the new document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{Item, Source};
use crate::storage::{PersistedState, StateStore};

/// JSON file state backend.
#[derive(Debug, Clone)]
pub struct LocalStateStore {
    path: PathBuf,
}

impl LocalStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn write_state(&self, state: &PersistedState) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&state.to_document())?;
        self.write_bytes(&bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    fn parse(&self, bytes: &[u8]) -> PersistedState {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return PersistedState::default();
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(document) if document.is_object() => PersistedState::from_document(&document),
            Ok(_) => {
                log::warn!("State file {} is not a JSON object", self.path.display());
                PersistedState::default()
            }
            Err(e) => {
                log::warn!("State file {} is unreadable: {}", self.path.display(), e);
                PersistedState::default()
            }
        }
    }
}

#[async_trait]
impl StateStore for LocalStateStore {
    async fn read(&self) -> Result<PersistedState> {
        match self.read_bytes().await? {
            Some(bytes) => Ok(self.parse(&bytes)),
            None => {
                log::info!("Creating state file {}", self.path.display());
                let state = PersistedState::default();
                self.write_state(&state).await?;
                Ok(state)
            }
        }
    }

    async fn set(&self, source: Source, item: &Item) -> Result<()> {
        let mut state = self.read().await?;
        state.set(source, item.clone());
        self.write_state(&state).await?;
        log::debug!("Stored last {} in {}", source.slot_key(), self.path.display());
        Ok(())
    }
}
