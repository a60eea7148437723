//! CLI configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tt_cache::PageCachePolicy;
use tt_data::{FetchClient, FetchPolicy, RetryPolicy, TimeoutConfig, DEFAULT_BASE_URL};
use tt_observability::LoggingConfig;

/// File names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["ttc.toml", ".ttc.toml", "ttc.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// API server.
    #[serde(default)]
    pub server: ServerConfig,

    /// Fetch timeouts and retries.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// In-process page cache.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Check the config. Returns `(errors, warnings)`.
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if let Err(e) = FetchClient::new(&self.server.base_url) {
            errors.push(format!("server.base_url: {}", e));
        }

        if self.fetch.timeout_ms == Some(0) {
            errors.push("fetch.timeout_ms must be greater than 0".to_string());
        }

        if self.fetch.retries > 10 {
            warnings.push(format!("fetch.retries = {} is unusually high", self.fetch.retries));
        }

        if self.cache.enabled && (self.cache.max_entries == 0 || self.cache.ttl_secs == 0) {
            warnings.push("cache is enabled but stores nothing (ttl_secs or max_entries is 0)".to_string());
        }

        (errors, warnings)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "json")
}

/// Find the nearest config file, walking up from `start`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

/// API server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the equipment API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Fetch settings. Both off unless set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Retries after a transient failure.
    #[serde(default)]
    pub retries: u32,
}

impl FetchConfig {
    pub fn policy(&self) -> FetchPolicy {
        let retry = if self.retries > 0 {
            RetryPolicy::new(self.retries)
        } else {
            RetryPolicy::none()
        };
        FetchPolicy::default()
            .with_timeout(TimeoutConfig::from_millis(self.timeout_ms))
            .with_retry(retry)
    }
}

/// Page cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_true() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_max_entries() -> usize {
    256
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    pub fn policy(&self) -> PageCachePolicy {
        PageCachePolicy {
            enabled: self.enabled,
            ttl: Duration::from_secs(self.ttl_secs),
            max_entries: self.max_entries,
        }
    }
}

/// Generate a default ttc.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# ttc configuration

[server]
base_url = "{base_url}"

[fetch]
# timeout_ms = 5000
retries = 0

[cache]
enabled = true
ttl_secs = 300
max_entries = 256

[logging]
level = "warn"
format = "human"
"#,
        base_url = DEFAULT_BASE_URL
    )
}
