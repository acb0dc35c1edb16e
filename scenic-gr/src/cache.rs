//! Response cache for completed resolutions
//!
//! TTL expiry is lazy: `get` treats stale entries as absent but leaves them
//! in place. Capacity is enforced on insert by evicting the oldest-inserted
//! key (FIFO on insertion order, reads do not refresh position).

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::types::ResolutionResult;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_CAPACITY: usize = 100;

/// Structural cache key: trimmed query plus requested limit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    limit: usize,
}

impl CacheKey {
    pub fn new(query: &str, limit: usize) -> Self {
        Self {
            query: query.trim().to_string(),
            limit,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: ResolutionResult,
    inserted_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Keys oldest-first; always the same key set as `entries`
    order: VecDeque<CacheKey>,
}

/// Process-wide TTL + FIFO-bounded cache
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    capacity: usize,
    inner: Mutex<Inner>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Cached value if present and younger than the TTL
    pub async fn get(&self, key: &CacheKey) -> Option<ResolutionResult> {
        let inner = self.inner.lock().await;
        let entry = inner.entries.get(key)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            tracing::debug!(query = %key.query, limit = key.limit, "Cache entry expired");
            return None;
        }
        Some(entry.value.clone())
    }

    /// Insert or replace. A new key at capacity evicts the oldest insertion first.
    pub async fn set(&self, key: CacheKey, value: ResolutionResult) {
        let mut inner = self.inner.lock().await;

        if inner.entries.contains_key(&key) {
            inner.order.retain(|k| k != &key);
        } else if inner.entries.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
                tracing::debug!(query = %oldest.query, limit = oldest.limit, "Cache evicted oldest entry");
            }
        }

        inner.order.push_back(key.clone());
        inner.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Physically present entries, expired or not
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.entries.clear();
        inner.order.clear();
    }

    /// Drop expired entries; returns how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let ttl = self.ttl;
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        let Inner { entries, order } = &mut *inner;
        order.retain(|k| entries.contains_key(k));
        before - entries.len()
    }
}
