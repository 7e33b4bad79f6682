//! URL-backed [`Location`].

use recipe_core::error::{RecipeError, Result};
use recipe_core::location::Location;
use reqwest::Url;
use std::sync::{PoisonError, RwLock};

/// Holds a URL whose query string mirrors the search state.
#[derive(Debug)]
pub struct UrlLocation {
    url: RwLock<Url>,
}

impl UrlLocation {
    pub fn new(url: Url) -> Self {
        Self {
            url: RwLock::new(url),
        }
    }

    pub fn parse(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| RecipeError::validation(format!("Invalid URL '{}': {}", url, e)))?;
        Ok(Self::new(url))
    }

    /// The current URL, query string included.
    pub fn url(&self) -> Url {
        self.url.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Location for UrlLocation {
    fn query_pairs(&self) -> Vec<(String, String)> {
        let url = self.url.read().unwrap_or_else(PoisonError::into_inner);
        url.query_pairs().into_owned().collect()
    }

    fn replace_query_pairs(&self, pairs: &[(String, String)]) {
        let mut url = self.url.write().unwrap_or_else(PoisonError::into_inner);
        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
    }
}
