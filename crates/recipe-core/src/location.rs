//! Location (URL query) capability.

/// Read/write access to the query parameters of the current location.
///
/// Routing itself is external; the coordination layer only needs the decoded
/// pairs on startup and a way to replace them after each change.
pub trait Location: Send + Sync {
    fn query_pairs(&self) -> Vec<(String, String)>;

    fn replace_query_pairs(&self, pairs: &[(String, String)]);
}
