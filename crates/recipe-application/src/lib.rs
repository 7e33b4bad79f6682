//! Coordination layer of the recipe client.
//!
//! Keeps search text, structured filters, pagination, persisted search
//! history and the remote-data cache consistent with one another:
//!
//! - [`debounce`]: delay primitives that coalesce bursts of input
//! - [`history`]: bounded, persisted search history
//! - [`filter`]: filter state ownership with change notification
//! - [`cache`]: keyed result cache with structured invalidation
//! - [`client`]: cached reads against the recipe API
//! - [`mutation`]: create/update/delete/import with cache upkeep
//! - [`search`]: the search session orchestrator

pub mod app;
pub mod cache;
pub mod client;
pub mod debounce;
pub mod filter;
pub mod history;
pub mod mutation;
pub mod search;

#[cfg(test)]
mod test_support;

pub use app::RecipeApp;
pub use client::{CachedData, RecipeClient};
pub use mutation::RecipeMutator;
pub use search::{SearchOrchestrator, SearchState};
