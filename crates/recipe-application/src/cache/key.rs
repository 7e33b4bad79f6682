//! Structured cache keys and invalidation targets.

use recipe_core::recipe::RecipeId;
use recipe_core::search::SearchParams;

/// Remote resource families held in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Recipes,
}

impl ResourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Recipes => "recipes",
        }
    }
}

/// What a key addresses within its resource family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyScope {
    /// A collection listing for one full parameter set.
    List(SearchParams),
    /// A single resource.
    Detail(RecipeId),
    /// An auxiliary lookup list (e.g. available cuisines).
    Lookup(&'static str),
}

/// Composite cache key: resource family plus discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub resource: ResourceKind,
    pub scope: KeyScope,
}

impl CacheKey {
    pub fn new(resource: ResourceKind, scope: KeyScope) -> Self {
        Self { resource, scope }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.scope, KeyScope::List(_))
    }
}

/// The set of keys an invalidation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheTarget {
    /// Exactly one key.
    Exact(CacheKey),
    /// Every listing of a resource, whatever its parameters.
    Lists(ResourceKind),
    /// Every key of a resource: listings, details and lookups.
    Resource(ResourceKind),
    /// Everything in the cache.
    All,
}

impl CacheTarget {
    pub fn matches(&self, key: &CacheKey) -> bool {
        match self {
            Self::Exact(target) => target == key,
            Self::Lists(resource) => key.resource == *resource && key.is_list(),
            Self::Resource(resource) => key.resource == *resource,
            Self::All => true,
        }
    }
}

/// Key-naming scheme for one resource family.
///
/// Every component that reads or invalidates recipe entries is handed the
/// same scheme, so listings and details always agree on their keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeKeys {
    resource: ResourceKind,
}

impl Default for RecipeKeys {
    fn default() -> Self {
        Self::new(ResourceKind::Recipes)
    }
}

impl RecipeKeys {
    pub fn new(resource: ResourceKind) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    /// Listing key for `params` in normalized form.
    pub fn list(&self, params: &SearchParams) -> CacheKey {
        CacheKey::new(self.resource, KeyScope::List(params.normalized()))
    }

    pub fn detail(&self, id: RecipeId) -> CacheKey {
        CacheKey::new(self.resource, KeyScope::Detail(id))
    }

    pub fn lookup(&self, name: &'static str) -> CacheKey {
        CacheKey::new(self.resource, KeyScope::Lookup(name))
    }

    pub fn lists(&self) -> CacheTarget {
        CacheTarget::Lists(self.resource)
    }

    pub fn all(&self) -> CacheTarget {
        CacheTarget::Resource(self.resource)
    }
}
