//! Search parameters and their query-string representation.

use serde::{Deserialize, Serialize};

use crate::filter::FilterState;
use crate::recipe::Difficulty;

/// Page size used when neither the URL nor the configuration sets one.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// The full parameter set of a listing request: query text, filters and
/// pagination.
///
/// Values are kept normalized (trimmed query, sorted set members) so two
/// equal searches always produce the same cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default)]
    pub filters: FilterState,
    pub page: u32,
    pub page_size: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: None,
            filters: FilterState::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchParams {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = normalize_query(&query.into());
        self
    }

    pub fn with_filters(mut self, filters: FilterState) -> Self {
        self.filters = filters.normalized();
        self
    }

    /// Brings hand-built parameters into the canonical form used for cache
    /// keys and change detection.
    pub fn normalize(&mut self) {
        self.query = self.query.as_deref().and_then(normalize_query);
        self.filters.normalize();
        self.page = self.page.max(1);
        self.page_size = self.page_size.max(1);
    }

    pub fn normalized(&self) -> Self {
        let mut params = self.clone();
        params.normalize();
        params
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Parameters sent to the listing endpoint. Page and page size are always
    /// present; inactive filters are omitted entirely.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.filter_pairs();
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("page_size".to_string(), self.page_size.to_string()));
        pairs
    }

    /// Parameters written back to the location. Defaults are left out so a
    /// pristine search has an empty query string.
    pub fn to_location_pairs(&self, default_page_size: u32) -> Vec<(String, String)> {
        let mut pairs = self.filter_pairs();
        if self.page > 1 {
            pairs.push(("page".to_string(), self.page.to_string()));
        }
        if self.page_size != default_page_size {
            pairs.push(("page_size".to_string(), self.page_size.to_string()));
        }
        pairs
    }

    fn filter_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut push = |name: &str, value: String| pairs.push((name.to_string(), value));

        if let Some(query) = &self.query {
            push("q", query.clone());
        }
        let filters = &self.filters;
        if let Some(cuisine) = filters.cuisine.as_deref().and_then(normalize_query) {
            push("cuisine", cuisine);
        }
        if let Some(difficulty) = filters.difficulty {
            push("difficulty", difficulty.to_string());
        }
        for diet in &filters.diet_types {
            push("diet_types", diet.clone());
        }
        for (range, min_name, max_name) in [
            (&filters.prep_time, "min_prep_time", "max_prep_time"),
            (&filters.cook_time, "min_cook_time", "max_cook_time"),
            (&filters.servings, "min_servings", "max_servings"),
        ] {
            if let Some(min) = range.min {
                push(min_name, min.to_string());
            }
            if let Some(max) = range.max {
                push(max_name, max.to_string());
            }
        }
        pairs
    }

    /// Rebuilds parameters from decoded query pairs. Unknown names are
    /// ignored and malformed values are treated as absent.
    pub fn from_query_pairs<I, K, V>(pairs: I, default_page_size: u32) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::new(default_page_size);
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            let filters = &mut params.filters;
            match key {
                "q" => params.query = normalize_query(value),
                "cuisine" => filters.cuisine = normalize_query(value),
                "difficulty" => filters.difficulty = parse_or_drop::<Difficulty>(key, value),
                "diet_types" => {
                    // Accept both repeated keys and comma-joined lists.
                    filters.diet_types.extend(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|v| !v.is_empty())
                            .map(str::to_string),
                    );
                }
                "min_prep_time" => filters.prep_time.min = parse_or_drop(key, value),
                "max_prep_time" => filters.prep_time.max = parse_or_drop(key, value),
                "min_cook_time" => filters.cook_time.min = parse_or_drop(key, value),
                "max_cook_time" => filters.cook_time.max = parse_or_drop(key, value),
                "min_servings" => filters.servings.min = parse_or_drop(key, value),
                "max_servings" => filters.servings.max = parse_or_drop(key, value),
                "page" => {
                    params.page = parse_or_drop::<u32>(key, value).unwrap_or(1).max(1);
                }
                "page_size" => {
                    params.page_size = parse_or_drop::<u32>(key, value)
                        .unwrap_or(default_page_size)
                        .max(1);
                }
                _ => {}
            }
        }
        params
    }

    /// True when `other` differs from `self` in anything but the page.
    pub fn differs_beyond_page(&self, other: &SearchParams) -> bool {
        self.query != other.query
            || self.filters != other.filters
            || self.page_size != other.page_size
    }
}

/// Trims a query; blank input becomes `None`.
pub fn normalize_query(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_or_drop<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    if value.is_empty() {
        return None;
    }
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::debug!("[SearchParams] Ignoring malformed value {}={:?}", key, value);
            None
        }
    }
}

impl From<FilterState> for SearchParams {
    fn from(filters: FilterState) -> Self {
        Self::default().with_filters(filters)
    }
}
