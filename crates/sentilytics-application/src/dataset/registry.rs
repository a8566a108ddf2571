use chrono::Utc;
use sentilytics_core::dataset::Dataset;
use sentilytics_core::state::{Operation, StateAction};
use sentilytics_core::{PersistenceService, Result, SentilyticsError};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use super::table::parse_table;
use crate::state::StateHandle;

/// Owns the session user's dataset collection.
///
/// The in-memory collection lives in application state in upload order.
/// Lookups by id always go to the persistence backend.
pub struct DatasetRegistry {
    persistence: Arc<dyn PersistenceService>,
    state: StateHandle,
}

impl DatasetRegistry {
    pub fn new(persistence: Arc<dyn PersistenceService>, state: StateHandle) -> Self {
        Self { persistence, state }
    }

    /// Stores `file_bytes` as a new dataset named `file_name`.
    ///
    /// Holds the busy state for the whole call. The dataset is appended to
    /// the collection only after the backend accepted it, and only if the
    /// session that started the upload is still signed in.
    ///
    /// # Errors
    ///
    /// - `Busy` if an upload or analysis is already running
    /// - `Upload` when signed out, when the bytes are not UTF-8, or when the
    ///   backend fails
    pub async fn upload(&self, file_bytes: &[u8], file_name: &str) -> Result<Dataset> {
        let busy = self.state.try_begin(Operation::Upload)?;

        let token = self
            .token()
            .ok_or_else(|| SentilyticsError::upload("Sign in before uploading a dataset"))?;

        let content = std::str::from_utf8(file_bytes).map_err(|e| {
            SentilyticsError::upload(format!("{file_name} is not valid UTF-8 text: {e}"))
        })?;

        let table = parse_table(content);
        let dataset = Dataset {
            id: Uuid::new_v4().to_string(),
            name: file_name.to_string(),
            upload_date: Utc::now(),
            row_count: table.row_count,
            preview: table.preview,
            content: content.to_string(),
        };

        self.persistence
            .save_dataset(&token, &dataset)
            .await
            .map_err(SentilyticsError::into_upload)?;

        tracing::info!(
            dataset_id = %dataset.id,
            name = %dataset.name,
            rows = dataset.row_count,
            "[DatasetRegistry] Dataset uploaded"
        );
        if !busy.session_is_current() {
            tracing::info!(
                dataset_id = %dataset.id,
                "[DatasetRegistry] Session ended during upload, not adding dataset"
            );
        }
        self.state.dispatch(StateAction::DatasetAdded {
            dataset: dataset.clone(),
            epoch: busy.session_epoch(),
        });
        Ok(dataset)
    }

    /// Reads `path` and uploads it under its file name.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                SentilyticsError::upload(format!("{} does not name a file", path.display()))
            })?;

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            SentilyticsError::upload(format!("Failed to read {}: {e}", path.display()))
        })?;

        self.upload(&bytes, &file_name).await
    }

    /// The in-memory collection in upload order.
    pub fn list(&self) -> Vec<Dataset> {
        self.state.read(|s| s.datasets.clone())
    }

    /// Replaces the in-memory collection with the backend's list.
    pub async fn load_all(&self) -> Result<Vec<Dataset>> {
        let (token, epoch) = self.state.read(|s| {
            (s.session.token().map(str::to_string), s.session_epoch)
        });
        let token = token.ok_or_else(|| SentilyticsError::authentication("Not signed in"))?;
        let datasets = self
            .persistence
            .list_datasets(&token)
            .await
            .map_err(as_persistence)?;

        tracing::debug!(count = datasets.len(), "[DatasetRegistry] Datasets loaded");
        self.state.dispatch(StateAction::DatasetsReplaced {
            datasets: datasets.clone(),
            epoch,
        });
        Ok(datasets)
    }

    /// Fetches one dataset from the backend. `Ok(None)` if it does not exist.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Dataset>> {
        let token = self.require_token()?;
        self.persistence
            .fetch_dataset(&token, id)
            .await
            .map_err(as_persistence)
    }

    fn token(&self) -> Option<String> {
        self.state.read(|s| s.session.token().map(str::to_string))
    }

    fn require_token(&self) -> Result<String> {
        self.token()
            .ok_or_else(|| SentilyticsError::authentication("Not signed in"))
    }
}

fn as_persistence(err: SentilyticsError) -> SentilyticsError {
    match err {
        SentilyticsError::Authentication(_) | SentilyticsError::Persistence(_) => err,
        other => SentilyticsError::persistence(other.to_string()),
    }
}
