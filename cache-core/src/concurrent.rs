//! The concurrent entry point: many reader threads, one writer at a time.
//!
//! Three semaphores implement the exact readers-preference discipline
//! from the design:
//!
//! - `write_mutex` is held by a writer for its whole insert/evict
//!   critical section, and by the first reader to arrive / last reader
//!   to leave (standard readers-writers).
//! - `count_mutex` protects `readers_count`.
//! - `lru_mutex` protects `last_access` updates, which both readers (on
//!   hit) and writers (when overwriting a victim in place) can perform.
//!
//! Readers may run fully in parallel; a writer excludes all readers and
//! vice versa. Under sustained read load, writers can starve — accepted
//! per the design, since correctness, not write fairness, is the goal.

use crate::cache::Cache;
use crate::error::CacheError;
use crate::sync::{binary_mutex, Semaphore};
use std::cell::UnsafeCell;
use std::sync::Arc;
use std::time::Instant;

/// Thread-safe wrapper around [`Cache`] implementing the readers/writer
/// protocol described above.
pub struct ConcurrentCache {
    inner: UnsafeCell<Cache>,
    readers_count: UnsafeCell<usize>,
    write_mutex: Semaphore,
    count_mutex: Semaphore,
    lru_mutex: Semaphore,
    epoch: Instant,
}

// Safety: every access to `inner` and `readers_count` is made only while
// holding the semaphore that the readers/writer protocol assigns to that
// access (`write_mutex` for the cache body, `count_mutex` for the reader
// count, `lru_mutex` for `last_access` stamps performed outside the
// writer's own critical section).
unsafe impl Sync for ConcurrentCache {}
unsafe impl Send for ConcurrentCache {}

impl ConcurrentCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: UnsafeCell::new(Cache::new()),
            readers_count: UnsafeCell::new(0),
            write_mutex: binary_mutex(),
            count_mutex: binary_mutex(),
            lru_mutex: binary_mutex(),
            epoch: Instant::now(),
        }
    }

    fn now(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Readers-preference search. On a hit, stamps `last_access` to the
    /// current time and returns a cheap clone of the response bytes.
    /// Never allocates a cache entry; its only failure mode is a miss.
    #[must_use]
    pub fn lookup(&self, url: &str) -> Option<Arc<[u8]>> {
        self.enter_reader();

        // Safety: at least one reader is registered, so `write_mutex` is
        // held on our collective behalf and no writer can be inside this
        // region. `find` only ever creates a shared `&Cache` view, so
        // distinct readers run this scan fully in parallel with each
        // other — no lock beyond the readers/writer protocol itself.
        let idx = unsafe { (*self.inner.get()).find(url) };

        let result = idx.map(|idx| {
            let now = self.now();
            self.lru_mutex.acquire();
            // Safety: same protected region as above; `lru_mutex` is the
            // only thing serializing this entry's `last_access` stamp
            // against other readers' stamps.
            unsafe { (*self.inner.get()).touch(idx, now) };
            self.lru_mutex.release();
            // Safety: `idx` was found live by `find` above, under the
            // same reader-protected region; no further lock is needed
            // to clone the `Arc`.
            unsafe { (*self.inner.get()).response_at(idx) }
        });

        self.leave_reader();
        result
    }

    fn enter_reader(&self) {
        self.count_mutex.acquire();
        // Safety: serialized by `count_mutex`.
        let count = unsafe {
            let c = &mut *self.readers_count.get();
            *c += 1;
            *c
        };
        if count == 1 {
            self.write_mutex.acquire();
        }
        self.count_mutex.release();
    }

    fn leave_reader(&self) {
        self.count_mutex.acquire();
        // Safety: serialized by `count_mutex`.
        let count = unsafe {
            let c = &mut *self.readers_count.get();
            *c -= 1;
            *c
        };
        if count == 0 {
            self.write_mutex.release();
        }
        self.count_mutex.release();
    }

    /// Writer-exclusive insert. See [`Cache::insert`] for eviction
    /// semantics. A rejected object (too large) leaves the cache
    /// untouched and is fatal only to the caller's request.
    ///
    /// # Errors
    /// Returns [`CacheError::ObjectTooLarge`] if `size` exceeds
    /// [`crate::cache::MAX_OBJECT_SIZE`]; the cache is left unchanged.
    pub fn insert(&self, url: String, response: Arc<[u8]>, size: usize) -> Result<(), CacheError> {
        self.write_mutex.acquire();
        // Safety: `write_mutex` excludes every reader and every other writer.
        let result = unsafe { (*self.inner.get()).insert(url, response, size, self.now()) };
        self.write_mutex.release();
        result
    }

    /// Snapshot of how many bytes are currently free. Takes `write_mutex`
    /// like any other access to cache-body state.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.write_mutex.acquire();
        let remaining = unsafe { (*self.inner.get()).remaining() };
        self.write_mutex.release();
        remaining
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.write_mutex.acquire();
        let len = unsafe { (*self.inner.get()).len() };
        self.write_mutex.release();
        len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ConcurrentCache {
    fn default() -> Self {
        Self::new()
    }
}
