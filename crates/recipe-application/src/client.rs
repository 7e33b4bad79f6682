//! Typed, cached read access to the recipe API.

use recipe_core::error::{RecipeError, Result};
use recipe_core::recipe::{Recipe, RecipeId, RecipePage};
use recipe_core::search::SearchParams;
use recipe_core::transport::Transport;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::cache::{QueryCache, RecipeKeys};

pub(crate) const RECIPES_PATH: &str = "/recipes";
const CUISINES_PATH: &str = "/recipes/cuisines";
const DIET_TYPES_PATH: &str = "/recipes/diet-types";

/// Values held by the recipe cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedData {
    Recipe(Box<Recipe>),
    Page(RecipePage),
    Lookup(Vec<String>),
}

impl CachedData {
    fn into_recipe(self) -> Result<Recipe> {
        match self {
            Self::Recipe(recipe) => Ok(*recipe),
            other => Err(mismatch("recipe", &other)),
        }
    }

    fn into_page(self) -> Result<RecipePage> {
        match self {
            Self::Page(page) => Ok(page),
            other => Err(mismatch("page", &other)),
        }
    }

    fn into_lookup(self) -> Result<Vec<String>> {
        match self {
            Self::Lookup(values) => Ok(values),
            other => Err(mismatch("lookup", &other)),
        }
    }
}

fn mismatch(expected: &str, found: &CachedData) -> RecipeError {
    let found = match found {
        CachedData::Recipe(_) => "recipe",
        CachedData::Page(_) => "page",
        CachedData::Lookup(_) => "lookup",
    };
    RecipeError::internal(format!(
        "cache entry holds a {} where a {} was expected",
        found, expected
    ))
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

pub(crate) fn detail_path(id: RecipeId) -> String {
    format!("{}/{}", RECIPES_PATH, id)
}

/// Reads recipes through the shared [`QueryCache`].
///
/// Reads never notify; failures are returned to the caller and leave any
/// previously cached value in place.
pub struct RecipeClient {
    transport: Arc<dyn Transport>,
    cache: Arc<QueryCache<CachedData>>,
    keys: RecipeKeys,
}

impl RecipeClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: Arc<QueryCache<CachedData>>,
        keys: RecipeKeys,
    ) -> Self {
        Self {
            transport,
            cache,
            keys,
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn cache(&self) -> &Arc<QueryCache<CachedData>> {
        &self.cache
    }

    pub fn keys(&self) -> RecipeKeys {
        self.keys
    }

    /// One page of recipes for the full parameter set.
    pub async fn list(&self, params: &SearchParams) -> Result<RecipePage> {
        let pairs = params.to_query_pairs();
        let transport = self.transport.clone();
        self.cache
            .read(self.keys.list(params), move || {
                let transport = transport.clone();
                let pairs = pairs.clone();
                async move {
                    let value = transport.get(RECIPES_PATH, &pairs).await?;
                    Ok(CachedData::Page(decode(value)?))
                }
            })
            .await?
            .into_page()
    }

    /// A single recipe by id.
    pub async fn recipe(&self, id: RecipeId) -> Result<Recipe> {
        let transport = self.transport.clone();
        self.cache
            .read(self.keys.detail(id), move || {
                let transport = transport.clone();
                async move {
                    let value = transport.get(&detail_path(id), &[]).await?;
                    Ok(CachedData::Recipe(Box::new(decode(value)?)))
                }
            })
            .await?
            .into_recipe()
    }

    /// Cuisines available for filtering.
    pub async fn cuisines(&self) -> Result<Vec<String>> {
        self.lookup("cuisines", CUISINES_PATH).await
    }

    /// Diet types available for filtering.
    pub async fn diet_types(&self) -> Result<Vec<String>> {
        self.lookup("diet_types", DIET_TYPES_PATH).await
    }

    async fn lookup(&self, name: &'static str, path: &'static str) -> Result<Vec<String>> {
        let transport = self.transport.clone();
        self.cache
            .read(self.keys.lookup(name), move || {
                let transport = transport.clone();
                async move {
                    let value = transport.get(path, &[]).await?;
                    Ok(CachedData::Lookup(decode(value)?))
                }
            })
            .await?
            .into_lookup()
    }
}
