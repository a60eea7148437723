//! Observability for the equipment catalog.
//!
//! This crate provides:
//! - `init_logging` - Installs the `tracing` subscriber (human or JSON output)
//! - `LoggingConfig` / `LogLevel` / `LogFormat` - Logging settings
//! - `FetchTimer` / `FetchMetrics` - Per-request timing records

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;
