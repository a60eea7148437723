//! Data access for the equipment listing API.
//!
//! This crate provides:
//! - `FetchClient` - HTTP client for page and item fetches
//! - `PageSource` - The seam the listing controller fetches pages through
//! - `PageOutcome` - A page, or the end-of-pagination signal (HTTP 404)
//! - `FetchPolicy` - Timeout and retry settings (both off by default)

mod client;
mod error;
mod retry;
mod source;
mod timeout;

pub use client::*;
pub use error::*;
pub use retry::*;
pub use source::*;
pub use timeout::*;
