use recipe_core::config::ClientConfig;
use recipe_core::error::Result;
use recipe_core::filter::{FilterField, FilterPatch, FilterState, SetField};
use recipe_core::location::Location;
use recipe_core::recipe::RecipePage;
use recipe_core::search::{SearchParams, normalize_query};
use std::sync::Arc;
use tokio::sync::watch;

use crate::cache::CacheTarget;
use crate::client::RecipeClient;
use crate::debounce::Debouncer;
use crate::filter::FilterStore;
use crate::history::HistoryStore;

/// Observable state of a search session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    /// Query text as typed, ahead of the debounce window.
    pub input: String,
    /// Parameters of the next listing read.
    pub params: SearchParams,
    /// Active filters among the committed parameters.
    pub active_filter_count: usize,
}

impl SearchState {
    fn from_params(params: SearchParams) -> Self {
        Self {
            input: params.query.clone().unwrap_or_default(),
            active_filter_count: params.filters.active_filter_count(),
            params,
        }
    }
}

struct Inner {
    state: watch::Sender<SearchState>,
    filters: FilterStore,
    history: Arc<HistoryStore>,
    client: Arc<RecipeClient>,
    location: Arc<dyn Location>,
    default_page_size: u32,
}

impl Inner {
    fn params(&self) -> SearchParams {
        self.state.borrow().params.clone()
    }

    fn read_location(&self) -> SearchParams {
        SearchParams::from_query_pairs(self.location.query_pairs(), self.default_page_size)
    }

    fn set_input(&self, text: &str) {
        self.state.send_if_modified(|state| {
            if state.input == text {
                return false;
            }
            state.input = text.to_string();
            true
        });
    }

    /// Applies `apply` to the committed parameters and normalizes them. Any
    /// effective change other than the page itself sends the page back to 1. The location is rewritten
    /// only when something changed.
    fn commit<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut SearchParams),
    {
        let changed = self.state.send_if_modified(|state| {
            let before = state.params.clone();
            apply(&mut state.params);
            state.params.normalize();
            if state.params.differs_beyond_page(&before) {
                state.params.page = 1;
            }
            state.active_filter_count = state.params.filters.active_filter_count();
            state.params != before
        });
        if changed {
            self.sync_location();
        }
        changed
    }

    fn commit_query(&self, text: &str) -> bool {
        let query = normalize_query(text);
        tracing::debug!("[SearchOrchestrator] Committing query: {:?}", query);
        self.commit(|params| params.query = query)
    }

    fn commit_filters(&self, filters: FilterState) -> bool {
        tracing::debug!(
            "[SearchOrchestrator] Committing {} active filters",
            filters.active_filter_count()
        );
        self.commit(|params| params.filters = filters)
    }

    fn sync_location(&self) {
        let pairs = self.params().to_location_pairs(self.default_page_size);
        self.location.replace_query_pairs(&pairs);
    }
}

/// Keeps query text, filters, pagination and the location in step, and
/// reads listings through the shared cache.
///
/// Query text is debounced before it reaches the parameters. Filter changes
/// are committed immediately unless a filter debounce window is configured.
/// Every committed change other than a page change resets the page to 1,
/// and every committed change is written back to the location.
pub struct SearchOrchestrator {
    inner: Arc<Inner>,
    query_debounce: Debouncer<String>,
    filter_debounce: Option<Debouncer<FilterState>>,
}

impl SearchOrchestrator {
    /// Derives the initial state from `location` and loads the persisted
    /// history.
    pub fn new(
        config: &ClientConfig,
        client: Arc<RecipeClient>,
        history: Arc<HistoryStore>,
        location: Arc<dyn Location>,
    ) -> Self {
        let default_page_size = config.page_size.max(1);
        let params = SearchParams::from_query_pairs(location.query_pairs(), default_page_size);
        let loaded = history.load();
        tracing::debug!(
            "[SearchOrchestrator] Initialised from location: {:?} ({} history entries)",
            params,
            loaded.len()
        );

        let (state, _) = watch::channel(SearchState::from_params(params.clone()));
        let inner = Arc::new(Inner {
            state,
            filters: FilterStore::new(params.filters),
            history,
            client,
            location,
            default_page_size,
        });

        let query_debounce = {
            let inner = inner.clone();
            Debouncer::new(config.search_debounce(), move |text: String| {
                inner.commit_query(&text);
            })
        };
        let filter_debounce = (config.filter_debounce_ms > 0).then(|| {
            let inner = inner.clone();
            Debouncer::new(config.filter_debounce(), move |filters: FilterState| {
                inner.commit_filters(filters);
            })
        });

        Self {
            inner,
            query_debounce,
            filter_debounce,
        }
    }

    // ---- query text ----

    /// Records typed text. The query parameter follows once the text has
    /// been stable for the search debounce window.
    pub fn set_query_text(&self, text: &str) {
        self.inner.set_input(text);
        self.query_debounce.call(text.to_string());
    }

    /// Commits `text` at once, skipping the debounce, and remembers it in
    /// the search history.
    pub fn submit_query(&self, text: &str) {
        self.query_debounce.cancel();
        self.inner.set_input(text);
        self.inner.commit_query(text);
        if let Some(query) = normalize_query(text) {
            self.inner.history.add(&query);
        }
    }

    pub fn is_query_pending(&self) -> bool {
        self.query_debounce.is_pending()
    }

    // ---- filters ----

    pub fn set_filters(&self, filters: FilterState) -> bool {
        let changed = self.inner.filters.set_filters(filters);
        self.filters_changed(changed)
    }

    pub fn update_filters(&self, patch: FilterPatch) -> bool {
        let changed = self.inner.filters.update_filters(patch);
        self.filters_changed(changed)
    }

    pub fn clear_filters(&self) -> bool {
        let changed = self.inner.filters.clear_filters();
        self.filters_changed(changed)
    }

    /// Clears one field. Ranges lose both bounds together.
    pub fn clear_filter(&self, field: FilterField) -> bool {
        let changed = self.inner.filters.clear_field(field);
        self.filters_changed(changed)
    }

    /// Removes one member of a set-valued field, keeping the others.
    pub fn remove_filter_value(&self, field: SetField, value: &str) -> bool {
        let changed = self.inner.filters.remove_set_member(field, value);
        self.filters_changed(changed)
    }

    pub fn add_filter_value(&self, field: SetField, value: &str) -> bool {
        let changed = self.inner.filters.add_set_member(field, value);
        self.filters_changed(changed)
    }

    /// Badge-style removal: with a value on a set-valued field only that
    /// member goes, otherwise the field is cleared. A value passed for a
    /// scalar or range field is ignored.
    pub fn remove_filter(&self, field: FilterField, value: Option<&str>) -> bool {
        let changed = self.inner.filters.remove_filter(field, value);
        self.filters_changed(changed)
    }

    fn filters_changed(&self, changed: bool) -> bool {
        if changed {
            let filters = self.inner.filters.current();
            match &self.filter_debounce {
                Some(debouncer) => debouncer.call(filters),
                None => {
                    self.inner.commit_filters(filters);
                }
            }
        }
        changed
    }

    // ---- pagination ----

    /// Moves to `page` (at least 1) without touching query or filters.
    pub fn set_page(&self, page: u32) -> bool {
        let page = page.max(1);
        self.inner.commit(|params| params.page = page)
    }

    pub fn next_page(&self) -> bool {
        let page = self.inner.params().page.saturating_add(1);
        self.set_page(page)
    }

    pub fn previous_page(&self) -> bool {
        let page = self.inner.params().page.saturating_sub(1);
        self.set_page(page)
    }

    // ---- state access ----

    pub fn params(&self) -> SearchParams {
        self.inner.params()
    }

    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    /// Filters as edited. Runs ahead of `params().filters` while a filter
    /// debounce is pending.
    pub fn filters(&self) -> FilterState {
        self.inner.filters.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    pub fn subscribe_filters(&self) -> watch::Receiver<FilterState> {
        self.inner.filters.subscribe()
    }

    pub fn has_active_filters(&self) -> bool {
        self.inner.filters.has_active_filters()
    }

    pub fn active_filter_count(&self) -> usize {
        self.inner.filters.active_filter_count()
    }

    // ---- reads ----

    /// The listing for the current parameters, served from cache when fresh.
    pub async fn results(&self) -> Result<RecipePage> {
        let params = self.params();
        self.inner.client.list(&params).await
    }

    /// Marks the current listing stale and reads it again.
    pub async fn refetch(&self) -> Result<RecipePage> {
        let params = self.params();
        let client = &self.inner.client;
        client
            .cache()
            .invalidate(&CacheTarget::Exact(client.keys().list(&params)))
            .await;
        client.list(&params).await
    }

    // ---- navigation ----

    /// Re-derives all state from the location after an external navigation.
    /// Pending debounced changes are discarded and the location is not
    /// rewritten.
    pub fn on_navigate(&self) {
        self.cancel_pending();
        let params = self.inner.read_location();
        self.inner.filters.set_filters(params.filters.clone());
        self.inner.state.send_if_modified(|state| {
            let next = SearchState::from_params(params);
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
    }

    /// Drops query, filters and page, and clears the location.
    pub fn reset(&self) {
        self.cancel_pending();
        self.inner.filters.clear_filters();
        self.inner
            .state
            .send_replace(SearchState::from_params(SearchParams::new(self.inner.default_page_size)));
        self.inner.sync_location();
    }

    fn cancel_pending(&self) {
        self.query_debounce.cancel();
        if let Some(debouncer) = &self.filter_debounce {
            debouncer.cancel();
        }
    }

    // ---- history ----

    pub fn history(&self) -> Vec<String> {
        self.inner.history.entries()
    }

    pub fn add_to_history(&self, query: &str) {
        self.inner.history.add(query);
    }

    pub fn remove_from_history(&self, query: &str) {
        self.inner.history.remove(query);
    }

    pub fn clear_history(&self) {
        self.inner.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{QueryCache, RecipeKeys};
    use crate::test_support::{Call, MemoryLocation, MemoryStorage, MockTransport, page_json};
    use recipe_core::filter::RangeFilter;
    use recipe_core::storage::KeyValueStore;
    use std::time::Duration;

    struct Harness {
        transport: Arc<MockTransport>,
        location: Arc<MemoryLocation>,
        storage: Arc<MemoryStorage>,
        search: SearchOrchestrator,
    }

    fn harness_with(config: ClientConfig, location: &[(&str, &str)]) -> Harness {
        let transport = Arc::new(MockTransport::new(|call| {
            let page = call.param("page").and_then(|p| p.parse().ok()).unwrap_or(1);
            Ok(page_json(Vec::new(), page))
        }));
        let location = Arc::new(MemoryLocation::with(location));
        let storage = Arc::new(MemoryStorage::default());
        let client = Arc::new(RecipeClient::new(
            transport.clone(),
            Arc::new(QueryCache::new()),
            RecipeKeys::default(),
        ));
        let history = Arc::new(HistoryStore::with_defaults(storage.clone()));
        let search = SearchOrchestrator::new(&config, client, history, location.clone());
        Harness {
            transport,
            location,
            storage,
            search,
        }
    }

    fn harness(location: &[(&str, &str)]) -> Harness {
        harness_with(ClientConfig::default(), location)
    }

    fn last_get(transport: &MockTransport) -> Call {
        transport.gets().pop().unwrap()
    }

    #[tokio::test]
    async fn test_initial_state_comes_from_location() {
        let h = harness(&[("q", "pasta"), ("cuisine", "italian"), ("page", "2")]);
        let state = h.search.state();

        assert_eq!(state.input, "pasta");
        assert_eq!(state.params.query.as_deref(), Some("pasta"));
        assert_eq!(state.params.page, 2);
        assert_eq!(state.active_filter_count, 1);
        assert_eq!(h.location.writes(), 0);
    }

    #[tokio::test]
    async fn test_initialisation_loads_history() {
        let transport = Arc::new(MockTransport::new(|_| Ok(page_json(Vec::new(), 1))));
        let storage = Arc::new(MemoryStorage::with("recipe_search_history", r#"["soup","stew"]"#));
        let client = Arc::new(RecipeClient::new(
            transport,
            Arc::new(QueryCache::new()),
            RecipeKeys::default(),
        ));
        let history = Arc::new(HistoryStore::with_defaults(storage));
        let search = SearchOrchestrator::new(
            &ClientConfig::default(),
            client,
            history,
            Arc::new(MemoryLocation::default()),
        );

        assert_eq!(search.history(), vec!["soup", "stew"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_text_is_debounced() {
        let h = harness(&[]);

        h.search.set_query_text("p");
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.search.set_query_text("pasta");
        assert_eq!(h.search.state().input, "pasta");
        assert_eq!(h.search.params().query, None);

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(h.search.params().query, None);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(h.search.params().query.as_deref(), Some("pasta"));
        assert_eq!(h.location.param("q").as_deref(), Some("pasta"));
        assert_eq!(h.location.writes(), 1);
    }

    #[tokio::test]
    async fn test_filter_change_resets_page() {
        let h = harness(&[("page", "3")]);
        assert_eq!(h.search.params().page, 3);

        h.search
            .update_filters(FilterPatch::new().cuisine(Some("thai")));

        assert_eq!(h.search.params().page, 1);
        assert_eq!(h.location.param("page"), None);
        assert_eq!(h.location.param("cuisine").as_deref(), Some("thai"));

        h.search.results().await.unwrap();
        let call = last_get(&h.transport);
        assert_eq!(call.param("page"), Some("1"));
        assert_eq!(call.param("cuisine"), Some("thai"));
    }

    #[tokio::test]
    async fn test_blank_filter_values_keep_page_and_cache() {
        let h = harness(&[("page", "3"), ("cuisine", "thai")]);
        h.search.results().await.unwrap();

        assert!(!h.search.update_filters(FilterPatch::new().cuisine(Some(" thai "))));
        assert!(!h.search.add_filter_value(SetField::DietTypes, "  "));

        assert_eq!(h.search.params().page, 3);
        assert_eq!(h.location.writes(), 0);
        h.search.results().await.unwrap();
        assert_eq!(h.transport.gets().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_cuisine_on_unfiltered_search_keeps_page() {
        let h = harness(&[("page", "3")]);
        h.search.results().await.unwrap();

        h.search.update_filters(FilterPatch::new().cuisine(Some("")));

        assert_eq!(h.search.params().page, 3);
        assert_eq!(h.search.state().active_filter_count, 0);
        h.search.results().await.unwrap();
        assert_eq!(h.transport.gets().len(), 1);
    }

    #[tokio::test]
    async fn test_page_change_keeps_filters() {
        let h = harness(&[("diet_types", "vegan")]);

        assert!(h.search.set_page(4));

        let params = h.search.params();
        assert_eq!(params.page, 4);
        assert!(params.filters.diet_types.contains("vegan"));
        assert_eq!(h.location.param("page").as_deref(), Some("4"));
        assert_eq!(h.location.param("diet_types").as_deref(), Some("vegan"));
    }

    #[tokio::test]
    async fn test_clearing_range_filter_drops_both_bounds() {
        let h = harness(&[("min_prep_time", "10"), ("max_prep_time", "30")]);
        assert_eq!(
            h.search.params().filters.prep_time,
            RangeFilter::between(10, 30)
        );

        assert!(h.search.clear_filter(FilterField::PrepTime));
        h.search.results().await.unwrap();

        let call = last_get(&h.transport);
        assert_eq!(call.param("min_prep_time"), None);
        assert_eq!(call.param("max_prep_time"), None);
        assert!(!h.search.has_active_filters());
    }

    #[tokio::test]
    async fn test_badge_removal_of_range_clears_whole_field() {
        let h = harness(&[("min_servings", "2"), ("max_servings", "4")]);

        h.search.remove_filter(FilterField::Servings, None);

        assert!(!h.search.params().filters.servings.is_active());
        assert_eq!(h.location.param("min_servings"), None);
        assert_eq!(h.location.param("max_servings"), None);
    }

    #[tokio::test]
    async fn test_badge_removal_ignores_value_on_scalar_field() {
        let h = harness(&[("cuisine", "thai"), ("min_servings", "2")]);

        assert!(h.search.remove_filter(FilterField::Cuisine, Some("greek")));
        assert!(h.search.remove_filter(FilterField::Servings, Some("2")));

        assert!(!h.search.has_active_filters());
        assert_eq!(h.location.param("cuisine"), None);
    }

    #[tokio::test]
    async fn test_remove_filter_value_keeps_other_members() {
        let h = harness(&[("diet_types", "vegan"), ("diet_types", "gluten-free")]);

        assert!(h.search.remove_filter_value(SetField::DietTypes, "vegan"));

        let diets: Vec<_> = h.search.params().filters.diet_types.into_iter().collect();
        assert_eq!(diets, vec!["gluten-free".to_string()]);
        assert!(!h.search.remove_filter_value(SetField::DietTypes, "vegan"));
    }

    #[tokio::test]
    async fn test_unchanged_filters_do_not_touch_location() {
        let h = harness(&[("cuisine", "thai")]);
        let current = h.search.filters();

        assert!(!h.search.set_filters(current));
        assert_eq!(h.location.writes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_query_skips_debounce_and_records_history() {
        let h = harness(&[("page", "2")]);

        h.search.set_query_text("sou");
        h.search.submit_query("  soup ");

        assert!(!h.search.is_query_pending());
        assert_eq!(h.search.params().query.as_deref(), Some("soup"));
        assert_eq!(h.search.params().page, 1);
        assert_eq!(h.search.history(), vec!["soup"]);
        assert!(h.storage.get("recipe_search_history").unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(h.search.params().query.as_deref(), Some("soup"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_debounce_window() {
        let config = ClientConfig {
            filter_debounce_ms: 300,
            ..Default::default()
        };
        let h = harness_with(config, &[]);

        h.search
            .update_filters(FilterPatch::new().diet_types(["vegan"]));
        assert_eq!(h.search.active_filter_count(), 1);
        assert_eq!(h.search.state().active_filter_count, 0);

        tokio::time::sleep(Duration::from_millis(301)).await;
        assert_eq!(h.search.state().active_filter_count, 1);
        assert_eq!(h.location.param("diet_types").as_deref(), Some("vegan"));
    }

    #[tokio::test]
    async fn test_results_are_cached_per_parameter_set() {
        let h = harness(&[]);

        h.search.results().await.unwrap();
        h.search.results().await.unwrap();
        assert_eq!(h.transport.gets().len(), 1);

        h.search.next_page();
        let page = h.search.results().await.unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(h.transport.gets().len(), 2);

        h.search.refetch().await.unwrap();
        assert_eq!(h.transport.gets().len(), 3);
    }

    #[tokio::test]
    async fn test_on_navigate_rereads_location() {
        let h = harness(&[("q", "pasta")]);
        h.location
            .replace_query_pairs(&[("q".to_string(), "curry".to_string())]);

        h.search.on_navigate();

        let state = h.search.state();
        assert_eq!(state.input, "curry");
        assert_eq!(state.params.query.as_deref(), Some("curry"));
        assert_eq!(h.location.writes(), 1);
    }

    #[tokio::test]
    async fn test_reset_clears_state_and_location() {
        let h = harness(&[("q", "pasta"), ("cuisine", "thai"), ("page", "5")]);

        h.search.reset();

        assert_eq!(h.search.params(), SearchParams::default());
        assert_eq!(h.search.state().input, "");
        assert!(h.location.query_pairs().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_filter_changes() {
        let h = harness(&[]);
        let mut updates = h.search.subscribe();

        h.search
            .update_filters(FilterPatch::new().cuisine(Some("mexican")));

        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().active_filter_count, 1);
    }
}
