//! Timeout configuration for fetch operations.

use std::time::Duration;

/// Timeout configuration for a fetch operation.
///
/// Both limits are off by default: a hung request keeps the listing in its
/// loading state until the caller gives up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Connection timeout.
    pub connect: Option<Duration>,
    /// Total operation timeout, per attempt.
    pub total: Option<Duration>,
}

impl TimeoutConfig {
    /// No timeouts.
    pub fn none() -> Self {
        Self::default()
    }

    /// Create from a single total timeout.
    pub fn from_total(total: Duration) -> Self {
        Self {
            connect: Some(Duration::from_millis(total.as_millis() as u64 / 4)),
            total: Some(total),
        }
    }

    /// Create from an optional millisecond value, as found in config files.
    pub fn from_millis(total_ms: Option<u64>) -> Self {
        total_ms
            .map(|ms| Self::from_total(Duration::from_millis(ms)))
            .unwrap_or_default()
    }

    pub fn is_enabled(&self) -> bool {
        self.connect.is_some() || self.total.is_some()
    }
}
