pub mod config;
pub mod diff;
pub mod fetch;
pub mod sync;

use color_eyre::Result;
use media_sync_config::{Config, PathManager};
use media_sync_core::SyncOrchestrator;
use media_sync_sources::{ImdbClient, TraktClient};
use std::path::PathBuf;
use tracing::debug;

/// Global flags every command needs to build its clients
pub struct RunContext {
    config_path: Option<PathBuf>,
    trace: bool,
}

impl RunContext {
    pub fn new(config_path: Option<PathBuf>, trace: bool) -> Self {
        Self { config_path, trace }
    }

    pub fn config_file(&self) -> PathBuf {
        PathManager::default().resolve_config_file(self.config_path.as_deref())
    }

    /// Loads and validates configuration; `--trace` overrides the configured flag
    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_file();
        debug!(path = %path.display(), "Loading configuration");
        let mut config = Config::load(&path)?;
        config.trace |= self.trace;
        Ok(config)
    }

    pub fn imdb(&self, config: &Config) -> Result<ImdbClient> {
        Ok(ImdbClient::from_config(config)?)
    }

    pub fn trakt(&self, config: &Config) -> Result<TraktClient> {
        Ok(TraktClient::from_config(config)?)
    }

    pub fn orchestrator(&self, dry_run: bool) -> Result<SyncOrchestrator> {
        let config = self.load_config()?;
        let source = self.imdb(&config)?;
        let destination = self.trakt(&config)?;
        Ok(SyncOrchestrator::new(Box::new(source), Box::new(destination)).with_dry_run(dry_run))
    }
}
