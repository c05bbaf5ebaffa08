use std::sync::Arc;

use serde_json::Value;

use crate::storage::{KeyValueStore, StorageError};

pub const HISTORY_KEY: &str = "search_history";
pub const HISTORY_CAPACITY: usize = 50;

/// Recent queries, most recent first, without duplicates. Every mutation
/// is written through to the key-value store.
pub struct SearchHistory {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<String>,
}

impl SearchHistory {
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let entries = match store.get(HISTORY_KEY).await? {
            Some(Value::Array(list)) => list
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .take(HISTORY_CAPACITY)
                .collect(),
            Some(other) => {
                log::warn!("ignoring malformed search history: {other}");
                vec![]
            }
            None => vec![],
        };

        Ok(Self { store, entries })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Moves `query` to the front, evicting the oldest entry past capacity.
    /// Blank queries are ignored.
    pub async fn add(&mut self, query: &str) -> Result<(), StorageError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        self.entries.retain(|entry| entry != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(HISTORY_CAPACITY);

        self.save().await
    }

    pub async fn remove(&mut self, query: &str) -> Result<(), StorageError> {
        let query = query.trim();
        self.entries.retain(|entry| entry != query);
        self.save().await
    }

    pub async fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        self.save().await
    }

    async fn save(&self) -> Result<(), StorageError> {
        self.store
            .set(HISTORY_KEY, serde_json::to_value(&self.entries)?)
            .await
    }
}
