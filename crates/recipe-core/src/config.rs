use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{RecipeError, Result};
use crate::search::DEFAULT_PAGE_SIZE;

/// Default query-text debounce window.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Default number of remembered search queries.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Default persistence key for search history.
pub const DEFAULT_HISTORY_KEY: &str = "recipe_search_history";

/// Client configuration. Every field has a default so a partial (or missing)
/// `config.toml` is valid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub search_debounce_ms: u64,
    /// 0 applies filter changes immediately.
    pub filter_debounce_ms: u64,
    pub history_limit: usize,
    pub history_storage_key: String,
    pub cache_stale_secs: u64,
    pub cache_retries: u32,
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            request_timeout_secs: 30,
            search_debounce_ms: DEFAULT_DEBOUNCE_MS,
            filter_debounce_ms: 0,
            history_limit: DEFAULT_HISTORY_LIMIT,
            history_storage_key: DEFAULT_HISTORY_KEY.to_string(),
            cache_stale_secs: 300,
            cache_retries: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn filter_debounce(&self) -> Duration {
        Duration::from_millis(self.filter_debounce_ms)
    }

    pub fn cache_stale_after(&self) -> Duration {
        Duration::from_secs(self.cache_stale_secs)
    }

    /// Rejects values the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(RecipeError::config(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                self.api_base_url
            )));
        }
        if self.history_limit == 0 {
            return Err(RecipeError::config("history_limit must be at least 1"));
        }
        if self.page_size == 0 {
            return Err(RecipeError::config("page_size must be at least 1"));
        }
        if self.history_storage_key.trim().is_empty() {
            return Err(RecipeError::config("history_storage_key must not be blank"));
        }
        Ok(())
    }
}
