//! CLI execution context.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tt_cache::{InMemoryPageCache, PageCache};
use tt_data::FetchClient;

use crate::config::{find_config, CliConfig};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the configuration came from, if a file was used.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from the given config file, or the nearest one.
    pub fn load(config_path: Option<&str>, server: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match config_path {
            Some(path) => Some(PathBuf::from(path)),
            None => find_config(&cwd),
        };
        let mut config = match &config_path {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };

        if let Some(server) = server {
            config.server.base_url = server.to_string();
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// HTTP client for the configured server.
    pub fn client(&self) -> Result<FetchClient> {
        FetchClient::with_policy(&self.config.server.base_url, self.config.fetch.policy())
            .with_context(|| format!("Invalid server URL: {}", self.config.server.base_url))
    }

    /// Page cache for this run, unless disabled.
    pub fn cache(&self) -> Option<Arc<dyn PageCache>> {
        let policy = self.config.cache.policy();
        if !policy.is_active() {
            return None;
        }
        Some(Arc::new(InMemoryPageCache::new(policy)))
    }
}
