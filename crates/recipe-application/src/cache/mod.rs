//! Remote-data cache.
//!
//! A keyed store of fetched results with structured keys, stale/expiry
//! handling and family-wide invalidation.

mod key;
mod query_cache;

pub use key::{CacheKey, CacheTarget, KeyScope, RecipeKeys, ResourceKind};
pub use query_cache::{CachePolicy, QueryCache};
