//! Tag-invalidated query cache
//!
//! Every cached query provides a set of tags. Mutations invalidate tags and
//! every entry providing a matching tag is marked stale, so it is refetched
//! on its next access. Nothing is edited in place except through
//! [`QueryCache::update_cached`], used for optimistic patches that the next
//! refetch reconciles.
//!
//! Identical concurrent queries are deduplicated: the first caller fetches,
//! the others wait on a per-key lock and read the stored result.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::CacheConfig;
use crate::utils::errors::AppError;

/// Resource collections known to the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TagType {
    Rides,
    RideRequests,
}

/// A collection tag, optionally narrowed to one record id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub kind: TagType,
    pub id: Option<String>,
}

impl Tag {
    pub fn collection(kind: TagType) -> Self {
        Self { kind, id: None }
    }

    pub fn item(kind: TagType, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: Some(id.into()),
        }
    }

    /// A bare collection tag invalidates every tag of its type; an id tag
    /// only invalidates the exact same id.
    pub fn invalidates(&self, provided: &Tag) -> bool {
        self.kind == provided.kind && (self.id.is_none() || self.id == provided.id)
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    tags: Vec<Tag>,
    fetched_at: Instant,
    last_accessed: Instant,
    stale: bool,
}

/// Cache statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Callers served by a fetch another caller had in flight
    pub deduplicated: u64,
    /// Entries marked stale by tag invalidation
    pub invalidated: u64,
    pub evicted: u64,
    pub fetch_errors: u64,
}

pub struct QueryCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    config: CacheConfig,
    stats: RwLock<CacheStats>,
}

impl<V: Clone + Send + Sync> QueryCache<V> {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            key_locks: Mutex::new(HashMap::new()),
            config,
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Return the cached value for `key`, running `fetch` when the entry is
    /// missing, invalidated or older than the configured staleness window.
    pub async fn query<F, Fut>(&self, key: &str, tags: Vec<Tag>, fetch: F) -> Result<V, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, AppError>>,
    {
        if let Some(value) = self.fresh(key).await {
            self.stats.write().await.hits += 1;
            debug!("Cache hit for query: {}", key);
            return Ok(value);
        }

        let lock = self.key_lock(key).await;
        let result = self.fetch_locked(key, tags, fetch, &lock).await;
        self.release_key_lock(key, lock).await;
        result
    }

    async fn fetch_locked<F, Fut>(
        &self,
        key: &str,
        tags: Vec<Tag>,
        fetch: F,
        lock: &Mutex<()>,
    ) -> Result<V, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, AppError>>,
    {
        let _guard = lock.lock().await;

        if let Some(value) = self.fresh(key).await {
            self.stats.write().await.deduplicated += 1;
            debug!("Query {} served by a concurrent fetch", key);
            return Ok(value);
        }

        self.stats.write().await.misses += 1;
        debug!("Cache miss for query: {}", key);

        match fetch().await {
            Ok(value) => {
                self.store(key, value.clone(), tags).await;
                Ok(value)
            }
            Err(e) => {
                self.stats.write().await.fetch_errors += 1;
                Err(e)
            }
        }
    }

    /// Mark the entry stale and fetch it again
    pub async fn refetch<F, Fut>(&self, key: &str, tags: Vec<Tag>, fetch: F) -> Result<V, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, AppError>>,
    {
        if let Some(entry) = self.entries.write().await.get_mut(key) {
            entry.stale = true;
        }
        self.query(key, tags, fetch).await
    }

    /// Mark every entry providing a tag matched by `tags` as stale.
    /// Returns the number of entries affected.
    pub async fn invalidate(&self, tags: &[Tag]) -> usize {
        let mut entries = self.entries.write().await;
        let mut count = 0;

        for (key, entry) in entries.iter_mut() {
            let hit = entry
                .tags
                .iter()
                .any(|provided| tags.iter().any(|t| t.invalidates(provided)));
            if hit && !entry.stale {
                entry.stale = true;
                count += 1;
                debug!("Invalidated query: {}", key);
            }
        }

        self.stats.write().await.invalidated += count as u64;
        count
    }

    /// Snapshot of the cached value, stale or not, without any network call
    pub async fn get_cached(&self, key: &str) -> Option<V> {
        self.entries.read().await.get(key).map(|e| e.value.clone())
    }

    /// Apply an in-place patch to a cached value. Returns whether the key was present.
    pub async fn update_cached<F>(&self, key: &str, patch: F) -> bool
    where
        F: FnOnce(&mut V),
    {
        match self.entries.write().await.get_mut(key) {
            Some(entry) => {
                patch(&mut entry.value);
                true
            }
            None => false,
        }
    }

    pub async fn is_stale(&self, key: &str) -> bool {
        match self.entries.read().await.get(key) {
            Some(entry) => !self.is_fresh(entry),
            None => true,
        }
    }

    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    pub async fn size(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        info!("Query cache cleared");
    }

    async fn fresh(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(key)?;
        if !self.is_fresh(entry) {
            return None;
        }
        entry.last_accessed = Instant::now();
        Some(entry.value.clone())
    }

    fn is_fresh(&self, entry: &CacheEntry<V>) -> bool {
        !entry.stale && entry.fetched_at.elapsed() < Duration::from_secs(self.config.stale_after_secs)
    }

    async fn store(&self, key: &str, value: V, tags: Vec<Tag>) {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(key) && entries.len() >= self.config.max_entries {
            self.evict_lru_entry(&mut entries).await;
        }

        let now = Instant::now();
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                tags,
                fetched_at: now,
                last_accessed: now,
                stale: false,
            },
        );
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.key_locks
            .lock()
            .await
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the per-key lock once no caller holds or waits on it
    async fn release_key_lock(&self, key: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.key_locks.lock().await;
        drop(lock);
        if locks.get(key).map_or(false, |l| Arc::strong_count(l) == 1) {
            locks.remove(key);
        }
    }

    async fn evict_lru_entry(&self, entries: &mut HashMap<String, CacheEntry<V>>) {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            entries.remove(&key);
            let mut locks = self.key_locks.lock().await;
            if locks.get(&key).map_or(false, |l| Arc::strong_count(l) == 1) {
                locks.remove(&key);
            }
            self.stats.write().await.evicted += 1;
            debug!("Evicted LRU query: {}", key);
        }
    }
}
