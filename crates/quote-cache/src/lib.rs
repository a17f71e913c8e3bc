use dashmap::DashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Time-boxed cache with single-flight population. Concurrent misses on the
/// same key collapse into one computation; independent keys never contend.
/// Expiry is checked lazily at lookup; errors are never cached.
pub struct QuoteCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    locks: DashMap<K, Arc<Mutex<()>>>,
    ttl: Duration,
}

impl<K, V> QuoteCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            locks: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        {
            let entry = self.entries.get(key)?;
            if entry.expires_at > Instant::now() {
                return Some(entry.value.clone());
            }
        }
        // Expired; the shard guard dropped above, so removal cannot deadlock
        self.entries.remove(key);
        None
    }

    fn insert(&self, key: K, value: V) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Fetch from cache or run `compute` to populate it. The per-key lock is
    /// held across the computation, so concurrent callers for the same key
    /// wait and then hit the freshly cached value on the double-check.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another caller may have populated the entry while we waited
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = compute().await?;
        self.insert(key.clone(), value.clone());
        Ok(value)
    }
}

impl<K, V> Default for QuoteCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
