//! Session-wide wiring of the coordination layer.

use recipe_core::config::ClientConfig;
use recipe_core::error::Result;
use recipe_core::location::Location;
use recipe_core::notification::Notifier;
use recipe_core::storage::KeyValueStore;
use recipe_core::transport::Transport;
use std::sync::Arc;

use crate::cache::{CachePolicy, QueryCache, RecipeKeys};
use crate::client::RecipeClient;
use crate::history::HistoryStore;
use crate::mutation::RecipeMutator;
use crate::search::SearchOrchestrator;

/// One client session.
///
/// Owns the single cache and history store of the session and hands the
/// same instances to every component that reads or writes them.
pub struct RecipeApp {
    config: ClientConfig,
    client: Arc<RecipeClient>,
    history: Arc<HistoryStore>,
    mutator: RecipeMutator,
    search: SearchOrchestrator,
}

impl RecipeApp {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        location: Arc<dyn Location>,
    ) -> Result<Self> {
        config.validate()?;

        let cache = Arc::new(QueryCache::with_policy(CachePolicy {
            stale_after: config.cache_stale_after(),
            retries: config.cache_retries,
        }));
        let client = Arc::new(RecipeClient::new(transport, cache, RecipeKeys::default()));
        let history = Arc::new(HistoryStore::new(
            storage,
            config.history_storage_key.clone(),
            config.history_limit,
        ));
        let mutator = RecipeMutator::new(client.clone(), notifier);
        let search = SearchOrchestrator::new(&config, client.clone(), history.clone(), location);

        tracing::debug!("[RecipeApp] Session started against {}", config.api_base_url);

        Ok(Self {
            config,
            client,
            history,
            mutator,
            search,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<RecipeClient> {
        &self.client
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn mutator(&self) -> &RecipeMutator {
        &self.mutator
    }

    pub fn search(&self) -> &SearchOrchestrator {
        &self.search
    }

    /// Marks every cached recipe entry stale.
    pub async fn invalidate_all(&self) -> usize {
        let keys = self.client.keys();
        self.client.cache().invalidate(&keys.all()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryLocation, MemoryStorage, MockTransport, RecordingNotifier, page_json, recipe_json};
    use recipe_core::error::RecipeError;

    fn app(config: ClientConfig) -> Result<RecipeApp> {
        let transport = MockTransport::new(|call| match call {
            crate::test_support::Call::Get(path, _) if path == "/recipes/1" => {
                Ok(recipe_json(1, "Dal"))
            }
            _ => Ok(page_json(vec![recipe_json(1, "Dal")], 1)),
        });
        RecipeApp::new(
            config,
            Arc::new(transport),
            Arc::new(MemoryStorage::default()),
            Arc::new(RecordingNotifier::default()),
            Arc::new(MemoryLocation::default()),
        )
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ClientConfig {
            page_size: 0,
            ..Default::default()
        };
        let err = app(config).err().unwrap();
        assert!(matches!(err, RecipeError::Config(_)));
    }

    #[tokio::test]
    async fn test_components_share_one_cache() {
        let app = app(ClientConfig::default()).unwrap();

        app.search().results().await.unwrap();
        app.client().recipe(1).await.unwrap();
        assert_eq!(app.client().cache().len().await, 2);

        assert_eq!(app.invalidate_all().await, 2);
    }

    #[tokio::test]
    async fn test_history_is_shared_with_search() {
        let app = app(ClientConfig::default()).unwrap();
        app.search().submit_query("ramen");
        assert!(app.history().contains("ramen"));
    }
}
