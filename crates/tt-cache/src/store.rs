//! Cache backends.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use tt_catalog::{EquipmentType, PageResult};

use crate::key::PageKey;
use crate::policy::PageCachePolicy;

/// Page cache backend trait.
#[async_trait]
pub trait PageCache: Send + Sync {
    /// Get a fresh cached page.
    async fn get(&self, key: &PageKey) -> Option<PageResult>;

    /// Store a successfully fetched page.
    async fn put(&self, key: PageKey, page: PageResult);

    /// Drop every page of one category. Returns the number removed.
    async fn invalidate(&self, equipment: EquipmentType) -> usize;

    /// Drop everything.
    async fn clear(&self);
}

#[async_trait]
impl<C: PageCache + ?Sized> PageCache for Arc<C> {
    async fn get(&self, key: &PageKey) -> Option<PageResult> {
        (**self).get(key).await
    }

    async fn put(&self, key: PageKey, page: PageResult) {
        (**self).put(key, page).await
    }

    async fn invalidate(&self, equipment: EquipmentType) -> usize {
        (**self).invalidate(equipment).await
    }

    async fn clear(&self) {
        (**self).clear().await
    }
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug)]
struct Entry {
    page: PageResult,
    stored_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<PageKey, Entry>,
    hits: u64,
    misses: u64,
}

/// In-memory page cache.
#[derive(Debug)]
pub struct InMemoryPageCache {
    policy: PageCachePolicy,
    inner: Mutex<Inner>,
}

impl InMemoryPageCache {
    pub fn new(policy: PageCachePolicy) -> Self {
        Self {
            policy,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn policy(&self) -> &PageCachePolicy {
        &self.policy
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.entries.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryPageCache {
    fn default() -> Self {
        Self::new(PageCachePolicy::default())
    }
}

#[async_trait]
impl PageCache for InMemoryPageCache {
    async fn get(&self, key: &PageKey) -> Option<PageResult> {
        if !self.policy.is_active() {
            return None;
        }

        let mut guard = self.lock();
        let inner = &mut *guard;
        let expired = inner
            .entries
            .get(key)
            .is_some_and(|entry| entry.stored_at.elapsed() >= self.policy.ttl);
        if expired {
            inner.entries.remove(key);
            tracing::debug!(key = %key, "cache entry expired");
        }

        match inner.entries.get(key).map(|entry| entry.page.clone()) {
            Some(page) => {
                inner.hits += 1;
                tracing::debug!(key = %key, "cache hit");
                Some(page)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    async fn put(&self, key: PageKey, page: PageResult) {
        if !self.policy.is_active() {
            return;
        }

        let mut inner = self.lock();
        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.policy.max_entries {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                inner.entries.remove(&oldest);
                tracing::debug!(key = %oldest, "cache entry evicted");
            }
        }

        inner.entries.insert(
            key,
            Entry {
                page,
                stored_at: Instant::now(),
            },
        );
    }

    async fn invalidate(&self, equipment: EquipmentType) -> usize {
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|key, _| key.equipment != equipment);
        before - inner.entries.len()
    }

    async fn clear(&self) {
        self.lock().entries.clear();
    }
}
