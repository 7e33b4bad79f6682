use recipe_core::config::{DEFAULT_HISTORY_KEY, DEFAULT_HISTORY_LIMIT};
use recipe_core::error::RecipeError;
use recipe_core::storage::KeyValueStore;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

/// Bounded, most-recently-used list of past search queries.
///
/// Entries are unique by exact (case-sensitive) value. Every mutation updates
/// the in-memory list and performs exactly one persisted write or delete
/// while holding the list lock, so writes never interleave.
pub struct HistoryStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    limit: usize,
    entries: RwLock<Vec<String>>,
    changes: watch::Sender<Vec<String>>,
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>, limit: usize) -> Self {
        let (changes, _) = watch::channel(Vec::new());
        Self {
            storage,
            key: key.into(),
            limit: limit.max(1),
            entries: RwLock::new(Vec::new()),
            changes,
        }
    }

    /// Store using the default key and a cap of ten entries.
    pub fn with_defaults(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::new(storage, DEFAULT_HISTORY_KEY, DEFAULT_HISTORY_LIMIT)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Reads the persisted list. Unreadable or malformed data is logged and
    /// replaced by an empty list; this never fails.
    pub fn load(&self) -> Vec<String> {
        let loaded = match self.storage.get(&self.key) {
            Ok(None) => Vec::new(),
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(self.limit);
                    entries
                }
                Err(e) => {
                    let err = RecipeError::corruption(&self.key, e.to_string());
                    tracing::warn!("[HistoryStore] Resetting search history: {}", err);
                    Vec::new()
                }
            },
            Err(err) => {
                tracing::warn!("[HistoryStore] Failed to read search history: {}", err);
                Vec::new()
            }
        };

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        *entries = loaded.clone();
        self.changes.send_replace(loaded.clone());
        loaded
    }

    /// Moves `query` to the front, dropping the oldest entry past the cap.
    /// Blank input is ignored without touching storage.
    pub fn add(&self, query: &str) {
        if query.trim().is_empty() {
            return;
        }
        self.mutate(|entries| {
            entries.retain(|entry| entry != query);
            entries.insert(0, query.to_string());
            entries.truncate(self.limit);
        });
    }

    /// Removes the exact-match entry, if present.
    pub fn remove(&self, query: &str) {
        self.mutate(|entries| entries.retain(|entry| entry != query));
    }

    /// Empties the list and deletes the persisted key.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
        self.storage.remove(&self.key);
        self.changes.send_replace(Vec::new());
        tracing::debug!("[HistoryStore] Cleared search history");
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contains(&self, query: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|entry| entry == query)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.changes.subscribe()
    }

    fn mutate<F>(&self, apply: F)
    where
        F: FnOnce(&mut Vec<String>),
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut *entries);

        match serde_json::to_string(&*entries) {
            Ok(serialized) => self.storage.set(&self.key, &serialized),
            Err(e) => tracing::warn!("[HistoryStore] Failed to serialize search history: {}", e),
        }
        self.changes.send_replace(entries.clone());
    }
}
