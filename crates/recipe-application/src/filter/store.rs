use recipe_core::filter::{FilterField, FilterPatch, FilterState, SetField};
use tokio::sync::watch;

/// Owner of the current [`FilterState`].
///
/// State is kept normalized (trimmed text, no blank values). Every mutation
/// reports whether the state actually changed; subscribers are only woken
/// for real changes.
pub struct FilterStore {
    state: watch::Sender<FilterState>,
}

impl FilterStore {
    pub fn new(initial: FilterState) -> Self {
        let (state, _) = watch::channel(initial.normalized());
        Self { state }
    }

    pub fn current(&self) -> FilterState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.state.subscribe()
    }

    /// Replaces the whole filter set.
    pub fn set_filters(&self, filters: FilterState) -> bool {
        self.modify(|state| {
            *state = filters;
        })
    }

    /// Shallow-merges `patch` into the current filters.
    pub fn update_filters(&self, patch: FilterPatch) -> bool {
        self.modify(|state| state.merge(patch))
    }

    pub fn clear_filters(&self) -> bool {
        self.set_filters(FilterState::default())
    }

    /// Clears one field entirely; both bounds for ranges.
    pub fn clear_field(&self, field: FilterField) -> bool {
        self.modify(|state| state.clear_field(field))
    }

    /// Removes one member from a set-valued field.
    pub fn remove_set_member(&self, field: SetField, value: &str) -> bool {
        self.modify(|state| {
            state.remove_set_member(field, value);
        })
    }

    /// Adds one member to a set-valued field.
    pub fn add_set_member(&self, field: SetField, value: &str) -> bool {
        self.modify(|state| {
            state.add_set_member(field, value);
        })
    }

    /// Badge-style removal: `value` selects a set member, otherwise the
    /// whole field is cleared.
    pub fn remove_filter(&self, field: FilterField, value: Option<&str>) -> bool {
        self.modify(|state| state.remove_filter(field, value))
    }

    pub fn has_active_filters(&self) -> bool {
        self.state.borrow().has_active_filters()
    }

    pub fn active_filter_count(&self) -> usize {
        self.state.borrow().active_filter_count()
    }

    fn modify<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut FilterState),
    {
        self.state.send_if_modified(|state| {
            let before = state.clone();
            apply(state);
            state.normalize();
            *state != before
        })
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new(FilterState::default())
    }
}
