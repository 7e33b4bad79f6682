//! Persisted search history.

mod store;

pub use store::HistoryStore;
