//! Domain layer of the recipe client.
//!
//! Holds the recipe resource models, structured search filters and their
//! query-string codec, the shared error type, configuration, and the
//! capability traits (transport, persistence, notification, location) the
//! coordination layer is built against.

pub mod config;
pub mod error;
pub mod filter;
pub mod location;
pub mod notification;
pub mod recipe;
pub mod search;
pub mod storage;
pub mod transport;

// Re-export common error type
pub use error::{RecipeError, Result};
