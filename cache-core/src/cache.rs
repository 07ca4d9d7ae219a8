//! The single-threaded cache core: a bounded LRU store keyed by URL.
//!
//! The list is index-based rather than pointer-based — entries live in
//! a slab (`Vec<Option<Entry>>`) and link to each other by slot index.
//! This gets the same "doubly linked list with back-edges" shape the
//! design calls for without raw pointers or the borrow-checker friction
//! a pointer-cyclic structure would otherwise cause: owning the forward
//! link and treating the back link as a plain index sidesteps both.

use crate::error::CacheError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Total bytes cacheable across all live entries.
pub const MAX_CACHE_SIZE: usize = 1_049_000;
/// A single response is only cacheable if its size is at most this many bytes.
pub const MAX_OBJECT_SIZE: usize = 102_400;

struct Entry {
    url: String,
    response: Arc<[u8]>,
    response_size: usize,
    /// Atomic so a reader can stamp it through a shared `&Cache` view —
    /// see [`Cache::touch`].
    last_access: AtomicU64,
    prev: Option<usize>,
    next: Option<usize>,
}

/// A bounded LRU cache of `url -> response bytes`.
///
/// This type has no internal synchronization; [`crate::concurrent::ConcurrentCache`]
/// wraps it with the readers/writer discipline described in the design.
pub struct Cache {
    slots: Vec<Option<Entry>>,
    free_slots: Vec<usize>,
    head: Option<usize>,
    remaining: usize,
}

impl Cache {
    /// An empty cache with the full byte budget available.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_slots: Vec::new(),
            head: None,
            remaining: MAX_CACHE_SIZE,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear search for a live entry with this URL. Returns its slot
    /// index. Takes `&self` only — this is the read-only half of a
    /// lookup, so [`crate::concurrent::ConcurrentCache`] can run it for
    /// several readers at once without any lock beyond the
    /// readers/writer protocol itself.
    pub(crate) fn find(&self, url: &str) -> Option<usize> {
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let entry = self.slots[idx].as_ref().expect("linked slot must be live");
            if entry.url == url {
                return Some(idx);
            }
            cursor = entry.next;
        }
        None
    }

    /// Cheap clone of slot `idx`'s response bytes (an `Arc` bump). `idx`
    /// must be a slot index just returned live by [`Cache::find`].
    pub(crate) fn response_at(&self, idx: usize) -> Arc<[u8]> {
        let entry = self.slots[idx].as_ref().expect("idx must be live");
        Arc::clone(&entry.response)
    }

    /// Stamp slot `idx`'s `last_access` to `now`. Takes `&self`: the
    /// field is an atomic, so this never requires exclusive access to
    /// the cache body. `idx` must be a slot index just returned live by
    /// [`Cache::find`].
    pub(crate) fn touch(&self, idx: usize, now: u64) {
        let entry = self.slots[idx].as_ref().expect("idx must be live");
        entry.last_access.store(now, Ordering::Relaxed);
    }

    /// Writer-side insert. If there isn't room, evicts least-recently-used
    /// entries first. Rejects objects over [`MAX_OBJECT_SIZE`] outright.
    ///
    /// # Errors
    /// Returns [`CacheError::ObjectTooLarge`] if `size` exceeds
    /// [`MAX_OBJECT_SIZE`]; the cache is left unchanged.
    pub fn insert(
        &mut self,
        url: String,
        response: Arc<[u8]>,
        size: usize,
        now: u64,
    ) -> Result<(), CacheError> {
        if size > MAX_OBJECT_SIZE {
            return Err(CacheError::ObjectTooLarge {
                size,
                limit: MAX_OBJECT_SIZE,
            });
        }

        // A fresh insert of a URL already present replaces the old entry;
        // reclaim its space first so eviction accounting stays correct.
        if let Some(idx) = self.find(&url) {
            self.unlink_and_free(idx);
        }

        if self.remaining >= size {
            self.push_front(Entry {
                url,
                response,
                response_size: size,
                last_access: AtomicU64::new(now),
                prev: None,
                next: None,
            });
            self.remaining -= size;
        } else {
            self.evict_and_overwrite(url, response, size, now);
        }
        Ok(())
    }

    /// Evict least-recently-used entries until the final victim's own
    /// size plus whatever is already free would satisfy `size`, then
    /// repurpose that victim's slot in place — overwriting its URL and
    /// response rather than unlinking it and inserting a fresh node.
    /// The victim keeps its position in the list; only a genuinely fresh
    /// insert goes to the front.
    fn evict_and_overwrite(&mut self, url: String, response: Arc<[u8]>, size: usize, now: u64) {
        loop {
            let lru_idx = self
                .find_lru()
                .expect("remaining < size implies at least one live entry");
            let lru_size = self.slots[lru_idx]
                .as_ref()
                .expect("lru index must be live")
                .response_size;
            if lru_size + self.remaining >= size {
                let entry = self.slots[lru_idx]
                    .as_mut()
                    .expect("lru index must be live");
                entry.url = url;
                entry.response = response;
                entry.response_size = size;
                entry.last_access.store(now, Ordering::Relaxed);
                self.remaining += lru_size;
                self.remaining -= size;
                return;
            }
            self.unlink_and_free(lru_idx);
        }
    }

    /// Entry with the smallest `last_access`, scanning from the head.
    fn find_lru(&self) -> Option<usize> {
        let mut cursor = self.head;
        let mut best: Option<usize> = None;
        let mut best_access = u64::MAX;
        while let Some(idx) = cursor {
            let entry = self.slots[idx].as_ref().expect("linked slot must be live");
            let access = entry.last_access.load(Ordering::Relaxed);
            if access < best_access {
                best_access = access;
                best = Some(idx);
            }
            cursor = entry.next;
        }
        best
    }

    fn push_front(&mut self, mut entry: Entry) {
        entry.prev = None;
        entry.next = self.head;
        let idx = match self.free_slots.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                idx
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        };
        if let Some(old_head) = self.head {
            self.slots[old_head]
                .as_mut()
                .expect("linked slot must be live")
                .prev = Some(idx);
        }
        self.head = Some(idx);
    }

    /// Unlink slot `idx` from the list, free its storage, and return its
    /// slot to the free pool. Terminal: the entry is not observable
    /// again.
    fn unlink_and_free(&mut self, idx: usize) {
        let entry = self.slots[idx].take().expect("idx must be live");
        match entry.prev {
            Some(prev) => {
                self.slots[prev].as_mut().expect("prev must be live").next = entry.next;
            }
            None => self.head = entry.next,
        }
        if let Some(next) = entry.next {
            self.slots[next].as_mut().expect("next must be live").prev = entry.prev;
        }
        self.remaining += entry.response_size;
        self.free_slots.push(idx);
    }

    /// Total bytes currently held by live entries (invariant 3.2.1: this
    /// plus `remaining` always equals `MAX_CACHE_SIZE`).
    #[cfg(test)]
    pub(crate) fn live_bytes(&self) -> usize {
        let mut cursor = self.head;
        let mut total = 0;
        while let Some(idx) = cursor {
            let entry = self.slots[idx].as_ref().unwrap();
            total += entry.response_size;
            cursor = entry.next;
        }
        total
    }

    #[cfg(test)]
    pub(crate) fn urls(&self) -> Vec<&str> {
        let mut cursor = self.head;
        let mut out = Vec::new();
        while let Some(idx) = cursor {
            let entry = self.slots[idx].as_ref().unwrap();
            out.push(entry.url.as_str());
            cursor = entry.next;
        }
        out
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(size: usize) -> Arc<[u8]> {
        Arc::from(vec![0u8; size].into_boxed_slice())
    }

    #[test]
    fn eviction_overwrites_the_final_victim_in_place_rather_than_relinking_it() {
        let mut cache = Cache::new();
        let object_size = MAX_OBJECT_SIZE;
        let fit_count = MAX_CACHE_SIZE / object_size;

        for i in 0..fit_count {
            cache
                .insert(format!("u{i}"), body(object_size), object_size, i as u64)
                .unwrap();
        }
        // Recency order, most-recent first, is the reverse insertion order.
        let before: Vec<String> = cache.urls().into_iter().map(str::to_string).collect();
        let lru_url = before.last().unwrap().clone();

        let new_now = fit_count as u64;
        cache
            .insert("new".to_string(), body(object_size), object_size, new_now)
            .unwrap();

        let after = cache.urls();
        assert_eq!(after.len(), before.len());
        // The victim's old slot keeps its list position; only its fields changed.
        assert_eq!(after.last(), Some(&"new"));
        assert!(!after.contains(&lru_url.as_str()));
    }

    #[test]
    fn live_bytes_plus_remaining_always_equals_the_budget() {
        let mut cache = Cache::new();
        for i in 0..5 {
            cache.insert(format!("u{i}"), body(1000), 1000, i as u64).unwrap();
        }
        assert_eq!(cache.live_bytes() + cache.remaining(), MAX_CACHE_SIZE);
    }
}
