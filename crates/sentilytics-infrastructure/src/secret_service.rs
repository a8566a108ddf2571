//! `secret.json` reader.

use crate::paths::SentilyticsPaths;
use async_trait::async_trait;
use sentilytics_core::config::SecretConfig;
use sentilytics_core::secret::SecretService;
use sentilytics_core::{Result, SentilyticsError};
use std::path::PathBuf;
use tokio::sync::OnceCell;

/// [`SecretService`] over the `secret.json` in the Sentilytics home.
///
/// The file is parsed on first use and cached for the life of the process.
/// An empty file reads as "no secrets".
pub struct SecretServiceImpl {
    secret_path: PathBuf,
    cached: OnceCell<SecretConfig>,
}

impl SecretServiceImpl {
    /// Creates a template `secret.json` (mode 600) if none exists yet.
    pub fn new(paths: &SentilyticsPaths) -> Result<Self> {
        let secret_path = paths.ensure_secret_file().map_err(|e| {
            SentilyticsError::config(format!("Failed to prepare secret.json: {e}"))
        })?;

        Ok(Self {
            secret_path,
            cached: OnceCell::new(),
        })
    }

    async fn read_file(&self) -> Result<SecretConfig> {
        let content = tokio::fs::read_to_string(&self.secret_path)
            .await
            .map_err(|e| {
                SentilyticsError::config(format!(
                    "Failed to read {}: {e}",
                    self.secret_path.display()
                ))
            })?;

        if content.trim().is_empty() {
            tracing::debug!(path = %self.secret_path.display(), "[SecretService] secret.json is empty");
            return Ok(SecretConfig::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            SentilyticsError::config(format!(
                "Failed to parse {}: {e}",
                self.secret_path.display()
            ))
        })
    }
}

#[async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        self.cached
            .get_or_try_init(|| self.read_file())
            .await
            .cloned()
    }
}
