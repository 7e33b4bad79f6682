//! Listing search parameters.

pub mod params;

pub use params::{DEFAULT_PAGE_SIZE, SearchParams, normalize_query};
