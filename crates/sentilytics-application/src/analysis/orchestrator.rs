use sentilytics_core::analysis::{AnalysisPhase, AnalysisService};
use sentilytics_core::state::{Notice, Operation, StateAction};
use sentilytics_core::{Result, SentilyticsError};
use serde::Serialize;
use std::sync::Arc;

use crate::dataset::DatasetRegistry;
use crate::state::{BusyGuard, StateHandle};

/// Notice posted when either analysis call fails.
pub const ANALYSIS_FAILED_NOTICE: &str = "Analysis failed. Please check your API Key and try again.";

/// Outcome of a successful [`AnalysisOrchestrator::run_analysis`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub dataset_id: String,
    pub phase: AnalysisPhase,
    pub model_count: usize,
}

/// Runs sentiment analysis and model metric generation for one dataset.
///
/// Results are written to application state as each call succeeds, so a
/// failure in the metrics call leaves the fresh sentiment results in place.
pub struct AnalysisOrchestrator {
    registry: Arc<DatasetRegistry>,
    analysis: Arc<dyn AnalysisService>,
    state: StateHandle,
}

impl AnalysisOrchestrator {
    pub fn new(
        registry: Arc<DatasetRegistry>,
        analysis: Arc<dyn AnalysisService>,
        state: StateHandle,
    ) -> Self {
        Self {
            registry,
            analysis,
            state,
        }
    }

    /// Analyzes the dataset `dataset_id`.
    ///
    /// # Errors
    ///
    /// - `Busy` if an upload or analysis is already running
    /// - `DatasetNotFound` if the backend has no such dataset
    /// - `AnalysisService` if the dataset could not be fetched or either
    ///   analysis call failed
    ///
    /// - `Authentication` if the user logged out while a call was running;
    ///   nothing from the run is applied
    ///
    /// Every other error also posts a notice.
    pub async fn run_analysis(&self, dataset_id: &str) -> Result<AnalysisReport> {
        let busy = match self.state.try_begin(Operation::Analysis) {
            Ok(guard) => guard,
            Err(e) => {
                self.notify(Notice::error(e.to_string()));
                return Err(e);
            }
        };

        let mut phase = self.advance(dataset_id, AnalysisPhase::Idle);

        let dataset = match self.registry.get_by_id(dataset_id).await {
            Ok(Some(dataset)) => dataset,
            Ok(None) => {
                let err = SentilyticsError::dataset_not_found(dataset_id);
                tracing::warn!(dataset_id, "[AnalysisOrchestrator] Dataset not found");
                self.notify(Notice::error(err.to_string()));
                return Err(err);
            }
            Err(e) => return Err(self.fail(dataset_id, phase, e)),
        };

        phase = self.advance(dataset_id, phase);
        let sentiment = match self.analysis.analyze_sentiment(&dataset.content).await {
            Ok(sentiment) => sentiment,
            Err(e) => return Err(self.fail(dataset_id, phase, e)),
        };
        ensure_session(&busy, dataset_id)?;
        self.state.dispatch(StateAction::NlpResultsReplaced {
            results: sentiment.for_dataset(dataset_id),
            epoch: busy.session_epoch(),
        });

        phase = self.advance(dataset_id, phase);
        let metrics = match self.analysis.generate_metrics(&dataset.content).await {
            Ok(metrics) => metrics,
            Err(e) => return Err(self.fail(dataset_id, phase, e)),
        };
        ensure_session(&busy, dataset_id)?;
        let model_count = metrics.len();
        self.state.dispatch(StateAction::ModelMetricsReplaced {
            metrics,
            epoch: busy.session_epoch(),
        });

        let phase = self.advance(dataset_id, phase);
        self.notify(Notice::info(format!(
            "Analysis of {} complete ({} models evaluated)",
            dataset.name, model_count
        )));

        Ok(AnalysisReport {
            dataset_id: dataset_id.to_string(),
            phase,
            model_count,
        })
    }

    fn advance(&self, dataset_id: &str, from: AnalysisPhase) -> AnalysisPhase {
        let to = from.next();
        tracing::info!(dataset_id, from = %from, to = %to, "[AnalysisOrchestrator] Phase transition");
        to
    }

    /// Logs `cause`, posts the generic failure notice and returns the error
    /// handed to the caller. The caller's error does not say which step failed.
    fn fail(
        &self,
        dataset_id: &str,
        phase: AnalysisPhase,
        cause: SentilyticsError,
    ) -> SentilyticsError {
        tracing::error!(
            dataset_id,
            phase = %phase,
            next = %AnalysisPhase::Failed,
            error = %cause,
            "[AnalysisOrchestrator] Analysis failed"
        );
        self.notify(Notice::error(ANALYSIS_FAILED_NOTICE));
        SentilyticsError::analysis(ANALYSIS_FAILED_NOTICE)
    }

    fn notify(&self, notice: Notice) {
        self.state.dispatch(StateAction::NoticePosted(notice));
    }
}

/// Stops a run whose session ended while a call was in flight.
fn ensure_session(busy: &BusyGuard, dataset_id: &str) -> Result<()> {
    if busy.session_is_current() {
        return Ok(());
    }
    tracing::info!(
        dataset_id,
        "[AnalysisOrchestrator] Session ended during analysis, discarding results"
    );
    Err(SentilyticsError::authentication(
        "Session ended while the analysis was running",
    ))
}
