//! Key-value persistence backends.

mod atomic_toml;
mod file_store;
mod memory_store;

pub use atomic_toml::AtomicTomlFile;
pub use file_store::FileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;
