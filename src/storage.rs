use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;

pub trait StorageManager: Send + Sync {
    fn write(&self, ident: &str, data: &[u8]) -> std::io::Result<()>;
    fn read(&self, ident: &str) -> std::io::Result<Vec<u8>>;
    fn exists(&self, ident: &str) -> bool;
}

#[derive(Clone)]
pub struct BackendLocal {
    pub base_dir: PathBuf,
}

impl BackendLocal {
    pub fn new(storage_dir: &str) -> std::io::Result<Self> {
        let path = PathBuf::from(storage_dir);
        std::fs::create_dir_all(&path)?;
        Ok(BackendLocal { base_dir: path })
    }
}

impl StorageManager for BackendLocal {
    fn exists(&self, ident: &str) -> bool {
        std::fs::metadata(self.base_dir.join(ident)).is_ok()
    }

    fn read(&self, ident: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.base_dir.join(ident))
    }

    fn write(&self, ident: &str, data: &[u8]) -> std::io::Result<()> {
        let temp_path = self
            .base_dir
            .join(format!("{}-{ident}", rusty_ulid::generate_ulid_string()));

        std::fs::write(&temp_path, data)?;

        std::fs::rename(&temp_path, self.base_dir.join(ident))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    IO(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Asynchronous key-value storage. Each call is atomic on its own; there
/// are no transactions across keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// Stores every key as `<key>.json` on top of a [`StorageManager`].
pub struct FileKeyValueStore {
    storage: Arc<dyn StorageManager>,
}

impl FileKeyValueStore {
    pub fn new(storage: Arc<dyn StorageManager>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let storage = self.storage.clone();
        let ident = format!("{key}.json");

        let data = tokio::task::spawn_blocking(move || {
            if !storage.exists(&ident) {
                return Ok(None);
            }
            storage.read(&ident).map(Some)
        })
        .await??;

        match data {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let storage = self.storage.clone();
        let ident = format!("{key}.json");
        let data = serde_json::to_vec_pretty(&value)?;

        tokio::task::spawn_blocking(move || storage.write(&ident, &data)).await??;

        Ok(())
    }
}

/// In-process store for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: std::sync::Mutex<std::collections::HashMap<String, Value>>,
}

#[cfg(test)]
impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = BackendLocal::new(tmp.path().to_str().unwrap()).unwrap();
        let store = FileKeyValueStore::new(Arc::new(backend));

        assert_eq!(store.get("history").await.unwrap(), None);

        store.set("history", json!(["a", "b"])).await.unwrap();
        assert_eq!(store.get("history").await.unwrap(), Some(json!(["a", "b"])));
        assert!(tmp.path().join("history.json").exists());
    }

    #[tokio::test]
    async fn test_file_store_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = BackendLocal::new(tmp.path().to_str().unwrap()).unwrap();
        let store = FileKeyValueStore::new(Arc::new(backend));

        store.set("k", json!(1)).await.unwrap();
        store.set("k", json!(2)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(2)));
    }
}
