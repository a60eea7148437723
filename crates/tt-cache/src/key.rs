//! Cache keys.

use std::fmt;

use tt_catalog::EquipmentType;

/// Join a prefix and parts into a `:`-separated cache key.
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

/// Identifies one page of one listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub equipment: EquipmentType,
    /// Search term; `None` for the unfiltered listing.
    pub query: Option<String>,
    pub page: u32,
}

impl PageKey {
    /// Create a key. An empty query is the unfiltered listing.
    pub fn new(equipment: EquipmentType, query: Option<&str>, page: u32) -> Self {
        Self {
            equipment,
            query: query.filter(|q| !q.is_empty()).map(str::to_string),
            page,
        }
    }

    /// Render as `rubbers:q=<query|*>:p=<page>`.
    pub fn render(&self) -> String {
        cache_key!(
            self.equipment.as_path(),
            format!("q={}", self.query.as_deref().unwrap_or("*")),
            format!("p={}", self.page)
        )
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
