//! Error types surfaced by the cache core.

/// Why a response could not be cached.
///
/// Per the cache's failure semantics, a rejected `insert` is fatal only
/// to that one request — the response is still served to the client,
/// just not remembered. Callers should treat this as informational, not
/// a reason to abort the request.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum CacheError {
    /// The response exceeds the per-object size cap and is never cacheable,
    /// regardless of how much space is free.
    #[error("response of {size} bytes exceeds the {limit}-byte per-object cache limit")]
    ObjectTooLarge { size: usize, limit: usize },
}
