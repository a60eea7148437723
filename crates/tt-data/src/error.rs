//! Fetch error types.

use std::time::Duration;

/// Error type for fetch operations.
///
/// HTTP 404 is not an error here: it is the end-of-pagination signal and is
/// reported through `PageOutcome::EndOfPagination` (or `None` for items).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid page number {0}: pages start at 1")]
    InvalidPage(u32),

    #[error("HTTP error: {status} for {url}{}", describe(.message))]
    Http {
        status: u16,
        url: String,
        /// The server's `{"error": "..."}` text, when it sent one.
        message: Option<String>,
    },

    #[error("Timeout after {after:?} for {url}")]
    Timeout { url: String, after: Duration },

    #[error("Connection error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Deserialization error for {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

fn describe(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" ({})", m))
        .unwrap_or_default()
}

impl FetchError {
    /// HTTP status of the failing response, if one arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure is transient (timeout, connection, or 5xx).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::Http { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}
