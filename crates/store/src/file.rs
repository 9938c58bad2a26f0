use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::{PreferenceStore, StoreChange, StoreError, CHANGE_CAPACITY};

/// JSON object on disk, re-read on every `get` so writes by other processes
/// are seen immediately.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    changes: broadcast::Sender<StoreChange>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            changes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file absent");
                return Ok(Map::new());
            }
            Err(err) => return Err(StoreError::Io(err.to_string())),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::Malformed(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
            Err(err) => Err(StoreError::Malformed(err.to_string())),
        }
    }

    async fn write_all(&self, map: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| StoreError::Io(err.to_string()))?;
        }
        let body = serde_json::to_vec_pretty(map)
            .map_err(|err| StoreError::Malformed(err.to_string()))?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, body)
            .await
            .map_err(|err| StoreError::Io(err.to_string()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|err| StoreError::Io(err.to_string()))
    }

    async fn update<F>(&self, key: &str, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Map<String, Value>) -> Option<Option<Value>>,
    {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_all().await?;
        let Some(change) = apply(&mut map) else {
            return Ok(());
        };
        self.write_all(&map).await?;
        info!(path = %self.path.display(), key, "preference updated");
        let _ = self.changes.send(StoreChange {
            key: key.to_string(),
            value: change,
        });
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.update(key, |map| {
            map.insert(key.to_string(), value.clone());
            Some(Some(value))
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(key, |map| map.remove(key).map(|_| None)).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
