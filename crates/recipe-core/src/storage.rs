//! Key-value persistence capability.

use crate::error::Result;

/// Synchronous string storage keyed by name.
///
/// Reads are fallible (the backing medium may hold corrupt data); writes and
/// removals never fail from the caller's point of view. Implementations log
/// write failures instead of returning them.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str);

    fn remove(&self, key: &str);
}
