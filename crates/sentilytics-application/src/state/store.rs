//! Composition root that the presentation layer talks to.

use sentilytics_core::analysis::{AnalysisService, ModelMetric, NlpResults};
use sentilytics_core::dataset::Dataset;
use sentilytics_core::session::{PendingRegistration, Session, TokenStore};
use sentilytics_core::state::{AppState, BusyState, Notice, StateAction};
use sentilytics_core::{PersistenceService, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

use super::handle::StateHandle;
use crate::analysis::{AnalysisOrchestrator, AnalysisReport};
use crate::dataset::DatasetRegistry;
use crate::session::SessionManager;

/// Wires the session, dataset and analysis components around one shared
/// [`StateHandle`] and exposes their actions together with state reads.
pub struct ApplicationStateStore {
    state: StateHandle,
    sessions: SessionManager,
    datasets: Arc<DatasetRegistry>,
    analysis: AnalysisOrchestrator,
}

impl ApplicationStateStore {
    pub fn new(
        persistence: Arc<dyn PersistenceService>,
        analysis: Arc<dyn AnalysisService>,
        token_store: Arc<dyn TokenStore>,
    ) -> Self {
        let state = StateHandle::new();
        let sessions = SessionManager::new(persistence.clone(), token_store, state.clone());
        let datasets = Arc::new(DatasetRegistry::new(persistence, state.clone()));
        let analysis = AnalysisOrchestrator::new(datasets.clone(), analysis, state.clone());

        Self {
            state,
            sessions,
            datasets,
            analysis,
        }
    }

    // ---------------------------------------------------------------------
    // Actions
    // ---------------------------------------------------------------------

    pub async fn restore_session(&self) -> Session {
        self.sessions.restore_session().await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        self.sessions.login(email, password).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Session> {
        self.sessions.register(name, email, password).await
    }

    pub async fn complete_registration(&self, password: &str) -> Result<Session> {
        self.sessions.complete_registration(password).await
    }

    pub async fn logout(&self) {
        self.sessions.logout().await
    }

    pub async fn upload_dataset(&self, file_bytes: &[u8], file_name: &str) -> Result<Dataset> {
        self.datasets.upload(file_bytes, file_name).await
    }

    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        self.datasets.upload_file(path).await
    }

    /// Refreshes the dataset collection from the backend.
    pub async fn load_dashboard_data(&self) -> Result<Vec<Dataset>> {
        self.datasets.load_all().await
    }

    pub async fn get_dataset(&self, id: &str) -> Result<Option<Dataset>> {
        self.datasets.get_by_id(id).await
    }

    pub async fn run_analysis(&self, dataset_id: &str) -> Result<AnalysisReport> {
        self.analysis.run_analysis(dataset_id).await
    }

    pub fn dismiss_notices(&self) {
        self.state.dispatch(StateAction::NoticesDismissed);
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub fn snapshot(&self) -> AppState {
        self.state.snapshot()
    }

    pub fn session(&self) -> Session {
        self.sessions.current_session()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read(|s| s.session.is_authenticated())
    }

    pub fn datasets(&self) -> Vec<Dataset> {
        self.datasets.list()
    }

    pub fn nlp_results(&self) -> Option<NlpResults> {
        self.state.read(|s| s.nlp_results.clone())
    }

    pub fn model_metrics(&self) -> Vec<ModelMetric> {
        self.state.read(|s| s.model_metrics.clone())
    }

    pub fn is_busy(&self) -> bool {
        self.state.read(AppState::is_busy)
    }

    pub fn busy_state(&self) -> BusyState {
        self.state.read(|s| s.busy)
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.state.read(|s| s.notices.clone())
    }

    /// The latest registration, if its login step is still outstanding.
    pub fn pending_registration(&self) -> Option<PendingRegistration> {
        self.state
            .read(|s| s.registration.clone())
            .filter(PendingRegistration::is_pending)
    }

    /// Receives every new snapshot.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// The shared state handle, for components built outside this store.
    pub fn state_handle(&self) -> &StateHandle {
        &self.state
    }
}
