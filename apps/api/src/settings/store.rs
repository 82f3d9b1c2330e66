//! Key/value settings stores.
//!
//! The pipeline only ever reads through `SettingsStore::get_many`; writes come from
//! the options surface. Stores do not cache, so a change made between two
//! requests is visible to the second one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for setting '{key}': {reason}")]
    Invalid { key: String, reason: String },

    #[error("Settings write task failed: {0}")]
    Task(String),
}

/// Multi-key reads see one consistent state; multi-key writes land together.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// One value per requested key, in order.
    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<Value>>, SettingsError>;
    async fn set_many(&self, entries: Vec<(&str, Value)>) -> Result<(), SettingsError>;
}

/// Process-local store, used when no settings file is configured and in tests.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<Value>>, SettingsError> {
        let values = self.values.read().await;
        Ok(keys.iter().map(|key| values.get(*key).cloned()).collect())
    }

    async fn set_many(&self, entries: Vec<(&str, Value)>) -> Result<(), SettingsError> {
        let mut values = self.values.write().await;
        for (key, value) in entries {
            values.insert(key.to_string(), value);
        }
        Ok(())
    }
}

/// A JSON object on disk, re-read on every `get`. Writes replace the file
/// atomically so a concurrent reader sees either the old or the new document.
#[derive(Debug)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> Result<Map<String, Value>, SettingsError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(Map::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<Value>>, SettingsError> {
        let mut document = self.read_document().await?;
        Ok(keys.iter().map(|key| document.remove(*key)).collect())
    }

    async fn set_many(&self, entries: Vec<(&str, Value)>) -> Result<(), SettingsError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        for (key, value) in entries {
            document.insert(key.to_string(), value);
        }

        let path = self.path.clone();
        let serialized = serde_json::to_vec_pretty(&document)?;
        tokio::task::spawn_blocking(move || write_atomically(&path, &serialized))
            .await
            .map_err(|e| SettingsError::Task(e.to_string()))?
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), SettingsError> {
    use std::io::Write;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| SettingsError::Io(e.error))?;
    Ok(())
}
