//! Builds the application from the on-disk layout.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sentilytics_application::ApplicationStateStore;
use sentilytics_core::analysis::{AnalysisService, ModelMetric, SentimentAnalysis};
use sentilytics_core::{Result as CoreResult, SentilyticsError};
use sentilytics_infrastructure::{
    ConfigService, FileTokenStore, LocalPersistenceService, SecretServiceImpl, SentilyticsPaths,
};
use sentilytics_interaction::GeminiAnalysisService;
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

use crate::logging;

/// A started application with its session restored.
pub struct App {
    pub store: ApplicationStateStore,
    _log_guard: WorkerGuard,
}

impl App {
    pub async fn start(home: Option<&Path>) -> Result<Self> {
        let paths = SentilyticsPaths::from_env(home);

        let config = ConfigService::new(&paths)?
            .get_config()
            .context("Failed to load config.toml")?;

        let logs_dir = paths.logs_dir()?;
        let log_guard = logging::init(&logs_dir, &config.logging.level)?;
        tracing::debug!(logs_dir = %logs_dir.display(), "[Bootstrap] Logging initialized");

        let secrets = SecretServiceImpl::new(&paths)?;
        let analysis: Arc<dyn AnalysisService> =
            match GeminiAnalysisService::from_settings(&config.analysis, &secrets).await {
                Ok(service) => {
                    tracing::info!(model = %service.model(), "[Bootstrap] Gemini analysis service ready");
                    Arc::new(service)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "[Bootstrap] Analysis service unavailable");
                    Arc::new(UnconfiguredAnalysis {
                        reason: e.to_string(),
                    })
                }
            };

        let persistence = Arc::new(LocalPersistenceService::new(&paths)?);
        let token_store = Arc::new(FileTokenStore::new(paths.session_file()?));

        let store = ApplicationStateStore::new(persistence, analysis, token_store);
        store.restore_session().await;

        Ok(Self {
            store,
            _log_guard: log_guard,
        })
    }
}

/// Stands in when no API key is configured, so account and dataset commands
/// still work. Every analysis call fails with the configuration problem.
struct UnconfiguredAnalysis {
    reason: String,
}

#[async_trait]
impl AnalysisService for UnconfiguredAnalysis {
    async fn analyze_sentiment(&self, _raw_text: &str) -> CoreResult<SentimentAnalysis> {
        Err(SentilyticsError::config(self.reason.clone()))
    }

    async fn generate_metrics(&self, _raw_text: &str) -> CoreResult<Vec<ModelMetric>> {
        Err(SentilyticsError::config(self.reason.clone()))
    }
}
