use recipe_core::error::{RecipeError, Result};
use recipe_core::storage::KeyValueStore;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::atomic_toml::AtomicTomlFile;
use crate::paths::RecipePaths;

type Entries = BTreeMap<String, String>;

/// Key-value store backed by a single TOML table on disk.
///
/// Every `set` and `remove` is one locked read-modify-write of the file.
/// An unparseable file is replaced on the next write. Write failures are
/// logged and swallowed.
pub struct FileKeyValueStore {
    file: AtomicTomlFile<Entries>,
}

impl FileKeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    /// Store at the platform default location.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(RecipePaths::storage_file()?))
    }

    fn write<F>(&self, key: &str, apply: F)
    where
        F: FnOnce(&mut Entries),
    {
        if let Err(e) = self.file.update_or_reset(Entries::new(), apply) {
            tracing::warn!(
                "[FileKeyValueStore] Failed to write '{}' to {}: {}",
                key,
                self.file.path().display(),
                e
            );
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.file.load() {
            Ok(entries) => Ok(entries.and_then(|mut entries| entries.remove(key))),
            Err(RecipeError::Serialization { message, .. }) => Err(RecipeError::corruption(
                self.file.path().display().to_string(),
                message,
            )),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) {
        self.write(key, |entries| {
            entries.insert(key.to_string(), value.to_string());
        });
    }

    fn remove(&self, key: &str) {
        self.write(key, |entries| {
            entries.remove(key);
        });
    }
}
