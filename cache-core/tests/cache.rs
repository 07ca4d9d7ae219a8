use cache_core::{CacheError, ConcurrentCache, MAX_CACHE_SIZE, MAX_OBJECT_SIZE};
use std::sync::Arc;
use std::thread;

fn body_of(size: usize, fill: u8) -> Arc<[u8]> {
    Arc::from(vec![fill; size].into_boxed_slice())
}

#[test]
fn miss_on_empty_cache() {
    let cache = ConcurrentCache::new();
    assert_eq!(cache.lookup("http://example.com/"), None);
    assert!(cache.is_empty());
}

#[test]
fn insert_then_lookup_is_a_hit() {
    let cache = ConcurrentCache::new();
    let body = body_of(128, 0xAB);
    cache
        .insert("http://example.com/a".to_string(), Arc::clone(&body), body.len())
        .unwrap();

    let found = cache.lookup("http://example.com/a").expect("must hit");
    assert_eq!(&*found, &*body);
    assert_eq!(cache.len(), 1);
}

#[test]
fn object_over_the_per_object_limit_is_rejected() {
    let cache = ConcurrentCache::new();
    let body = body_of(MAX_OBJECT_SIZE + 1, 0);
    let err = cache
        .insert("http://example.com/huge".to_string(), Arc::clone(&body), body.len())
        .unwrap_err();
    assert_eq!(
        err,
        CacheError::ObjectTooLarge {
            size: MAX_OBJECT_SIZE + 1,
            limit: MAX_OBJECT_SIZE,
        }
    );
    assert!(cache.is_empty());
}

#[test]
fn reinserting_the_same_url_replaces_the_entry() {
    let cache = ConcurrentCache::new();
    let first = body_of(64, 1);
    let second = body_of(64, 2);
    cache
        .insert("http://example.com/a".to_string(), Arc::clone(&first), first.len())
        .unwrap();
    cache
        .insert("http://example.com/a".to_string(), Arc::clone(&second), second.len())
        .unwrap();

    assert_eq!(cache.len(), 1);
    let found = cache.lookup("http://example.com/a").unwrap();
    assert_eq!(&*found, &*second);
}

#[test]
fn filling_past_capacity_evicts_least_recently_used_entries() {
    let cache = ConcurrentCache::new();
    let object_size = MAX_OBJECT_SIZE;
    let fit_count = MAX_CACHE_SIZE / object_size;

    for i in 0..fit_count {
        let url = format!("http://example.com/{i}");
        cache
            .insert(url, body_of(object_size, i as u8), object_size)
            .unwrap();
    }
    assert_eq!(cache.len(), fit_count);

    // Touch every entry but the first, so it is uniquely least-recently-used.
    for i in 1..fit_count {
        let url = format!("http://example.com/{i}");
        assert!(cache.lookup(&url).is_some());
    }

    let new_url = "http://example.com/new".to_string();
    cache
        .insert(new_url.clone(), body_of(object_size, 0xFF), object_size)
        .unwrap();

    assert!(cache.lookup("http://example.com/0").is_none());
    assert!(cache.lookup(&new_url).is_some());
    assert_eq!(cache.len(), fit_count);
}

#[test]
fn eviction_reclaims_exactly_as_many_victims_as_needed() {
    let cache = ConcurrentCache::new();
    let object_size = MAX_OBJECT_SIZE;
    let fit_count = MAX_CACHE_SIZE / object_size;

    for i in 0..fit_count {
        let url = format!("http://example.com/{i}");
        cache
            .insert(url, body_of(object_size, i as u8), object_size)
            .unwrap();
    }

    let remaining_before = cache.remaining();
    // A request that fits in the slack already free plus exactly one
    // eviction should remove exactly one entry, not more.
    let small = remaining_before + 1;
    assert!(small <= object_size);

    cache
        .insert("http://example.com/small".to_string(), body_of(small, 7), small)
        .unwrap();

    assert_eq!(cache.len(), fit_count);
}

#[test]
fn concurrent_readers_and_a_writer_do_not_corrupt_state() {
    let cache = Arc::new(ConcurrentCache::new());
    for i in 0..8 {
        let url = format!("http://example.com/{i}");
        cache.insert(url, body_of(1024, i as u8), 1024).unwrap();
    }

    let mut handles = Vec::new();
    for i in 0..8 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for _ in 0..200 {
                let url = format!("http://example.com/{}", i % 8);
                let _ = cache.lookup(&url);
            }
        }));
    }
    {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 8..40 {
                let url = format!("http://example.com/{i}");
                cache.insert(url, body_of(1024, i as u8), 1024).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.len() <= MAX_CACHE_SIZE / 1024);
    assert_eq!(cache.remaining() + cache.len() * 1024, MAX_CACHE_SIZE);
}
