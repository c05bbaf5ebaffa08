use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
    time::Duration,
};

use tokio::time::Instant;

use crate::bookmarks::ScoredBookmark;

pub const CACHE_TTL: Duration = Duration::from_millis(300_000);
pub const CACHE_CAPACITY: usize = 100;

const KEY_SEPARATOR: char = '\u{0}';

struct CacheEntry {
    results: Vec<ScoredBookmark>,
    stored_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Keys in insertion order, oldest first.
    order: VecDeque<String>,
}

/// Memoizes search results by query and bookmark id set.
///
/// Expired entries are only shadowed on lookup; they keep their slot until
/// insertion-order eviction pushes them out. Reads never refresh an entry.
pub struct SearchCache {
    state: Mutex<CacheState>,
    ttl: Duration,
    capacity: usize,
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchCache {
    pub fn new() -> Self {
        Self::with_limits(CACHE_TTL, CACHE_CAPACITY)
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// The id list is sorted before joining so that the same set in any
    /// order hits the same entry. A NUL keeps the query apart from the ids.
    pub fn key<S: AsRef<str>>(query: &str, ids: &[S]) -> String {
        let mut ids: Vec<&str> = ids.iter().map(|id| id.as_ref()).collect();
        ids.sort_unstable();
        format!("{query}{KEY_SEPARATOR}{}", ids.join(","))
    }

    pub fn get<S: AsRef<str>>(&self, query: &str, ids: &[S]) -> Option<Vec<ScoredBookmark>> {
        let key = Self::key(query, ids);
        let state = self.state.lock().ok()?;
        let entry = state.entries.get(&key)?;

        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.results.clone())
        } else {
            None
        }
    }

    pub fn set<S: AsRef<str>>(&self, query: &str, ids: &[S], results: Vec<ScoredBookmark>) {
        let key = Self::key(query, ids);
        let Ok(mut state) = self.state.lock() else {
            log::error!("search cache lock poisoned, dropping entry");
            return;
        };

        let entry = CacheEntry {
            results,
            stored_at: Instant::now(),
        };

        // overwriting keeps the original insertion slot
        if let Some(existing) = state.entries.get_mut(&key) {
            *existing = entry;
            return;
        }

        if state.entries.len() >= self.capacity {
            if let Some(oldest) = state.order.pop_front() {
                state.entries.remove(&oldest);
            }
        }

        state.order.push_back(key.clone());
        state.entries.insert(key, entry);
    }

    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.entries.clear();
            state.order.clear();
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.entries.len()).unwrap_or_default()
    }
}
