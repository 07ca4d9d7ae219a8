//! A bounded, concurrently-accessed LRU cache keyed by URL.
//!
//! [`Cache`] is the single-threaded core: a fixed byte budget, an
//! index-based doubly linked list ordering entries by recency, and an
//! eviction path that overwrites the final victim in place rather than
//! unlinking and reinserting it. [`ConcurrentCache`] wraps it with an
//! explicit readers-preference synchronization discipline built from
//! [`Semaphore`]s, for use from many connection-handling threads at
//! once.
//!
//! ```
//! use cache_core::ConcurrentCache;
//! use std::sync::Arc;
//!
//! let cache = ConcurrentCache::new();
//! let body: Arc<[u8]> = Arc::from(b"hello".as_slice());
//! cache.insert("http://example.com/".to_string(), Arc::clone(&body), body.len()).unwrap();
//! assert_eq!(cache.lookup("http://example.com/").as_deref(), Some(&*body));
//! assert_eq!(cache.lookup("http://example.com/missing"), None);
//! ```

mod cache;
mod concurrent;
mod error;
mod sync;

pub use cache::{Cache, MAX_CACHE_SIZE, MAX_OBJECT_SIZE};
pub use concurrent::ConcurrentCache;
pub use error::CacheError;
pub use sync::Semaphore;
