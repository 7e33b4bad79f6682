//! Infrastructure layer for the recipe client.
//!
//! Concrete implementations of the capability traits defined in
//! `recipe-core`: HTTP transport, key-value persistence, notifications and
//! location, plus configuration loading and platform paths.

pub mod config_service;
pub mod http_transport;
pub mod location;
pub mod notifier;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::http_transport::HttpTransport;
pub use crate::location::UrlLocation;
pub use crate::notifier::{ChannelNotifier, Notification, TracingNotifier};
pub use crate::paths::RecipePaths;
pub use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
