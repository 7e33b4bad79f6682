//! Structured search filters.

pub mod model;

pub use model::{FilterField, FilterPatch, FilterState, RangeFilter, SetField};
