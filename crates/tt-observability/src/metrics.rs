//! Per-request fetch metrics.

use std::time::{Duration, Instant};

use serde::Serialize;

/// Timing record for one outbound request, including retries.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FetchMetrics {
    /// What was fetched (e.g. `"page"`, `"item"`).
    pub tag: String,
    /// URL fetched.
    pub url: String,
    /// Final HTTP status code, if a response arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Wall time across all attempts (milliseconds).
    pub duration_ms: u64,
    /// Number of attempts made (1 when no retry happened).
    pub attempts: u32,
    /// Whether the request produced a usable answer.
    pub success: bool,
    /// Error message if failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchMetrics {
    /// Whether more than one attempt was needed.
    pub fn retried(&self) -> bool {
        self.attempts > 1
    }

    /// Emit the record as a `tracing` event.
    pub fn emit(&self) {
        if self.success {
            tracing::debug!(
                tag = %self.tag,
                url = %self.url,
                status = ?self.status_code,
                elapsed_ms = self.duration_ms,
                attempts = self.attempts,
                "fetch completed"
            );
        } else {
            tracing::warn!(
                tag = %self.tag,
                url = %self.url,
                status = ?self.status_code,
                elapsed_ms = self.duration_ms,
                attempts = self.attempts,
                error = self.error.as_deref().unwrap_or("unknown"),
                "fetch failed"
            );
        }
    }
}

/// Running timer for a request; turns into a `FetchMetrics` when finished.
#[derive(Debug)]
pub struct FetchTimer {
    tag: String,
    url: String,
    start: Instant,
    attempts: u32,
}

impl FetchTimer {
    /// Start timing a request.
    pub fn start(tag: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            url: url.into(),
            start: Instant::now(),
            attempts: 0,
        }
    }

    /// Record that an attempt is being made.
    pub fn attempt(&mut self) {
        self.attempts += 1;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Finish with a usable response.
    pub fn succeed(self, status_code: u16) -> FetchMetrics {
        self.finish(Some(status_code), true, None)
    }

    /// Finish with a failure.
    pub fn fail(self, status_code: Option<u16>, error: impl ToString) -> FetchMetrics {
        self.finish(status_code, false, Some(error.to_string()))
    }

    fn finish(self, status_code: Option<u16>, success: bool, error: Option<String>) -> FetchMetrics {
        FetchMetrics {
            tag: self.tag,
            url: self.url,
            status_code,
            duration_ms: self.start.elapsed().as_millis() as u64,
            attempts: self.attempts.max(1),
            success,
            error,
        }
    }
}
