use std::sync::Arc;
use std::thread;

use playbadge::LruCache;

#[test]
fn evicts_least_recently_used() {
    let cache = LruCache::new(2);
    cache.set("a".to_string(), 1);
    cache.set("b".to_string(), 2);
    assert_eq!(cache.get("a"), Some(1));

    let evicted = cache.set("c".to_string(), 3);
    assert_eq!(evicted.as_deref(), Some("b"));
    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.get("a"), Some(1));
    assert_eq!(cache.get("c"), Some(3));
    assert_eq!(cache.len(), 2);
}

#[test]
fn set_on_existing_key_refreshes_without_eviction() {
    let cache = LruCache::new(2);
    cache.set("a".to_string(), 1);
    cache.set("b".to_string(), 2);
    assert_eq!(cache.set("a".to_string(), 10), None);
    assert_eq!(cache.keys(), vec!["a".to_string(), "b".to_string()]);

    cache.set("c".to_string(), 3);
    assert_eq!(cache.get("a"), Some(10));
    assert_eq!(cache.get("b"), None);
}

#[test]
fn miss_leaves_order_untouched() {
    let cache = LruCache::new(3);
    cache.set(1, "one");
    cache.set(2, "two");
    assert_eq!(cache.get(&9), None);
    assert_eq!(cache.keys(), vec![2, 1]);
}

#[test]
fn zero_capacity_never_evicts() {
    let cache = LruCache::new(0);
    for i in 0..1_000 {
        assert_eq!(cache.set(i, i), None);
    }
    assert_eq!(cache.len(), 1_000);
    assert_eq!(cache.get(&0), Some(0));
}

#[test]
fn concurrent_access_keeps_capacity() {
    let cache = Arc::new(LruCache::new(64));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..500 {
                    let key = (t * 1_000 + i) % 200;
                    cache.set(key, i);
                    let _ = cache.get(&((key + 7) % 200));
                    assert!(cache.len() <= 64);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 64);
    let keys = cache.keys();
    assert_eq!(keys.len(), 64);
    for key in keys {
        assert!(cache.get(&key).is_some());
    }
}
