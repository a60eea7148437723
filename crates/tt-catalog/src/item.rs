//! Equipment items and their price-comparison entries.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::EquipmentId;

/// One retailer's offer for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    /// Product page on the retailer's site.
    #[serde(rename = "url")]
    pub source_url: String,
    /// Price as reported by the retailer (e.g. `"54.95"`).
    pub price: String,
    /// When the price was last scraped.
    pub last_updated: String,
    /// Whether the entry has not been refreshed recently.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_old: bool,
}

impl PriceEntry {
    /// Create a new price entry.
    pub fn new(
        source_url: impl Into<String>,
        price: impl Into<String>,
        last_updated: impl Into<String>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            price: price.into(),
            last_updated: last_updated.into(),
            is_old: false,
        }
    }

    /// Mark the entry as stale.
    pub fn stale(mut self) -> Self {
        self.is_old = true;
        self
    }

    /// Numeric value of the price, ignoring currency symbols and
    /// thousands separators. `None` if nothing numeric remains.
    pub fn amount(&self) -> Option<f64> {
        let digits: String = self
            .price
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        if digits.is_empty() {
            return None;
        }
        digits.parse().ok()
    }

    /// Parsed `last_updated` timestamp.
    ///
    /// Accepts RFC 3339, HTTP dates (`Wed, 21 Oct 2015 07:28:00 GMT`, as
    /// the catalog server serialises datetimes) and the naive
    /// `YYYY-MM-DD HH:MM:SS[.f]` form (interpreted as UTC).
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.last_updated.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    /// Host name of the retailer, without a leading `www.`.
    pub fn site(&self) -> &str {
        let without_scheme = self
            .source_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.source_url);
        let host = without_scheme.split('/').next().unwrap_or(without_scheme);
        host.strip_prefix("www.").unwrap_or(host)
    }
}

/// An equipment item with its price history across retailers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentItem {
    /// Backend-assigned identifier.
    #[serde(rename = "_id")]
    pub id: EquipmentId,
    /// Product name.
    pub name: String,
    /// Lowest price ever recorded for this item.
    pub all_time_low_price: String,
    /// Retailer entries, best price first as delivered by the API.
    #[serde(default)]
    pub entries: Vec<PriceEntry>,
}

impl EquipmentItem {
    /// Create an item with no price entries.
    pub fn new(
        id: impl Into<EquipmentId>,
        name: impl Into<String>,
        all_time_low_price: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            all_time_low_price: all_time_low_price.into(),
            entries: Vec::new(),
        }
    }

    /// Append a price entry, keeping delivery order.
    pub fn with_entry(mut self, entry: PriceEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// The headline entry: the first one, per the API's best-price-first order.
    pub fn best_entry(&self) -> Option<&PriceEntry> {
        self.entries.first()
    }

    /// Headline price string.
    pub fn best_price(&self) -> Option<&str> {
        self.best_entry().map(|e| e.price.as_str())
    }

    /// The numerically cheapest entry, skipping prices that don't parse.
    pub fn lowest_entry(&self) -> Option<&PriceEntry> {
        self.entries
            .iter()
            .filter_map(|e| e.amount().map(|a| (a, e)))
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, e)| e)
    }

    /// Name truncated to at most `max` characters, with an ellipsis.
    pub fn display_name(&self, max: usize) -> String {
        if self.name.chars().count() <= max {
            return self.name.clone();
        }
        let mut truncated: String = self.name.chars().take(max).collect();
        truncated.push_str("...");
        truncated
    }

    /// Whether any entry is flagged stale.
    pub fn has_stale_entries(&self) -> bool {
        self.entries.iter().any(|e| e.is_old)
    }
}
