//! Page caching for equipment listings.
//!
//! This crate provides:
//! - `PageKey` - Namespaced key for one page of one listing
//! - `PageCachePolicy` - TTL and capacity settings
//! - `PageCache` - Async cache backend trait
//! - `InMemoryPageCache` - Process-local backend
//!
//! The cache only short-circuits page fetches. A listing built with or
//! without it is identical.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use tt_cache::{InMemoryPageCache, PageCache, PageCachePolicy, PageKey};
//!
//! let cache = InMemoryPageCache::new(PageCachePolicy::new(Duration::from_secs(60)));
//! let key = PageKey::new(EquipmentType::Rubbers, Some("tenergy"), 1);
//! cache.put(key.clone(), page).await;
//! assert!(cache.get(&key).await.is_some());
//! ```

mod key;
mod policy;
mod store;

pub use key::*;
pub use policy::*;
pub use store::*;
