//! Page cache policy.

use std::time::Duration;

/// Default time-to-live for a cached page.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default capacity of the in-memory cache.
pub const DEFAULT_MAX_ENTRIES: usize = 256;

/// Cache configuration for listing pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCachePolicy {
    /// When false every lookup misses and nothing is stored.
    pub enabled: bool,
    /// How long a page stays fresh.
    pub ttl: Duration,
    /// Entries kept before the oldest is evicted.
    pub max_entries: usize,
}

impl PageCachePolicy {
    /// Enabled policy with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            enabled: true,
            ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Bypass the cache entirely.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Whether pages are stored at all.
    pub fn is_active(&self) -> bool {
        self.enabled && self.max_entries > 0 && !self.ttl.is_zero()
    }
}

impl Default for PageCachePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
