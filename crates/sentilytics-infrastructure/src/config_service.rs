//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml`, writing the defaults on
//! first use.

use crate::paths::SentilyticsPaths;
use crate::storage::AtomicTomlFile;
use sentilytics_core::config::RootConfig;
use sentilytics_core::{Result, SentilyticsError};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    config_path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a service reading `config.toml` from the resolved config directory.
    pub fn new(paths: &SentilyticsPaths) -> Result<Self> {
        let config_path = paths
            .config_file()
            .map_err(|e| SentilyticsError::config(e.to_string()))?;
        Ok(Self::with_path(config_path))
    }

    pub fn with_path(config_path: PathBuf) -> Self {
        Self {
            config_path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// A missing file is created with defaults. An unreadable file is an error
    /// rather than a silent fallback, so a typo in config.toml is noticed.
    pub fn get_config(&self) -> Result<RootConfig> {
        if let Some(cached) = self.read_cache() {
            return Ok(cached);
        }

        let loaded = self.load_config()?;

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn read_cache(&self) -> Option<RootConfig> {
        self.config.read().ok().and_then(|lock| lock.clone())
    }

    fn load_config(&self) -> Result<RootConfig> {
        let file = AtomicTomlFile::<RootConfig>::new(self.config_path.clone());

        match file.load()? {
            Some(config) => Ok(config),
            None => {
                let default_config = RootConfig::default();
                file.save(&default_config)?;
                tracing::info!(
                    "[ConfigService] Wrote default configuration to {}",
                    self.config_path.display()
                );
                Ok(default_config)
            }
        }
    }
}
