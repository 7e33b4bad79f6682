//! Filter state ownership.

mod store;

pub use store::FilterStore;
