use std::{
    any::Any,
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    inserted_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) < self.ttl
    }
}

/// Keyed TTL cache storing only validated, transformed values (§4.1).
///
/// Stale entries are evicted lazily on read, never proactively. There is no
/// negative caching: a failed fetch is never stored.
#[derive(Default)]
pub struct TtlCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the cached value for `key` if present and still
    /// within its TTL, downcast back to `T`.
    pub async fn get<T: Clone + Send + Sync + 'static>(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now) => entry.value.downcast_ref::<T>().cloned(),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub async fn insert<T: Send + Sync + 'static>(&self, key: String, value: T, ttl: Duration) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key,
            Entry {
                value: Arc::new(value),
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn returns_fresh_value_within_ttl() {
        let cache = TtlCache::new();
        cache
            .insert("k".to_string(), 42u32, Duration::from_secs(10))
            .await;
        assert_eq!(cache.get::<u32>("k").await, Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn evicts_stale_entries_on_read() {
        let cache = TtlCache::new();
        cache
            .insert("k".to_string(), 42u32, Duration::from_secs(1))
            .await;
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get::<u32>("k").await, None);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let cache = TtlCache::new();
        cache
            .insert("k".to_string(), 1u32, Duration::from_secs(60))
            .await;
        cache.clear().await;
        assert_eq!(cache.get::<u32>("k").await, None);
    }
}
