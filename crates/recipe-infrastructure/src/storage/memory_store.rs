use recipe_core::error::Result;
use recipe_core::storage::KeyValueStore;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Process-local key-value store. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_remove() {
        let store = MemoryKeyValueStore::new();
        store.set("a", "1");
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a");
        assert_eq!(store.get("a").unwrap(), None);
    }
}
