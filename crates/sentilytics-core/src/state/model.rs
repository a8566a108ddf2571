//! Application state snapshot and reducer.

use serde::{Deserialize, Serialize};

use crate::analysis::{ModelMetric, NlpResults};
use crate::dataset::Dataset;
use crate::session::{PendingRegistration, Session};

use super::action::StateAction;
use super::busy::BusyState;
use super::notice::{MAX_NOTICES, Notice};

/// Everything the presentation layer reads.
///
/// # Fields
///
/// * `session` - Current authentication state
/// * `datasets` - Uploaded datasets in upload order
/// * `nlp_results` - Output of the most recent analysis run
/// * `model_metrics` - Metrics of the most recent analysis run
/// * `busy` - Which upload/analysis is in flight, if any
/// * `notices` - Most recent user-visible messages, oldest first
/// * `registration` - The latest registration and how far its login step got
/// * `session_epoch` - Bumped whenever the session is established or cleared
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub session: Session,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
    pub nlp_results: Option<NlpResults>,
    #[serde(default)]
    pub model_metrics: Vec<ModelMetric>,
    #[serde(default)]
    pub busy: BusyState,
    #[serde(default)]
    pub notices: Vec<Notice>,
    pub registration: Option<PendingRegistration>,
    #[serde(default)]
    pub session_epoch: u64,
}

impl AppState {
    /// Creates the initial, signed-out state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Applies `action` and returns the resulting state.
    pub fn reduce(mut self, action: StateAction) -> Self {
        match action {
            StateAction::SessionEstablished(session) => {
                self.session = session;
                self.session_epoch = self.session_epoch.wrapping_add(1);
            }
            StateAction::SessionCleared => {
                self.session_epoch = self.session_epoch.wrapping_add(1);
                self.session = Session::anonymous();
                self.datasets.clear();
                self.nlp_results = None;
                self.model_metrics.clear();
                self.registration = None;
            }
            StateAction::RegistrationRecorded(pending) => {
                self.registration = Some(pending);
            }
            StateAction::DatasetAdded { dataset, epoch } => {
                if self.is_current(epoch) {
                    self.datasets.push(dataset);
                }
            }
            StateAction::DatasetsReplaced { datasets, epoch } => {
                if self.is_current(epoch) {
                    self.datasets = datasets;
                }
            }
            StateAction::NlpResultsReplaced { results, epoch } => {
                if self.is_current(epoch) {
                    self.nlp_results = Some(results);
                }
            }
            StateAction::ModelMetricsReplaced { metrics, epoch } => {
                if self.is_current(epoch) {
                    self.model_metrics = metrics;
                }
            }
            StateAction::OperationStarted { operation, ticket } => {
                if !self.busy.is_busy() {
                    self.busy = BusyState::Busy { operation, ticket };
                }
            }
            StateAction::OperationFinished { ticket } => {
                if self.busy.is_held_by(ticket) {
                    self.busy = BusyState::Idle;
                }
            }
            StateAction::NoticePosted(notice) => {
                self.notices.push(notice);
                if self.notices.len() > MAX_NOTICES {
                    let overflow = self.notices.len() - MAX_NOTICES;
                    self.notices.drain(..overflow);
                }
            }
            StateAction::NoticesDismissed => {
                self.notices.clear();
            }
        }
        self
    }

    /// Whether work started at `epoch` still belongs to the current session.
    pub fn is_current(&self, epoch: u64) -> bool {
        epoch == self.session_epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{SentimentStats, WordCloudItem};
    use crate::state::Operation;
    use crate::user::User;
    use chrono::Utc;

    fn dataset(id: &str) -> Dataset {
        Dataset {
            id: id.to_string(),
            name: format!("{id}.csv"),
            upload_date: Utc::now(),
            row_count: 1,
            preview: vec![vec!["x".to_string()]],
            content: "x".to_string(),
        }
    }

    fn results(id: &str) -> NlpResults {
        NlpResults {
            dataset_id: id.to_string(),
            stats: SentimentStats::from_counts(1, 0, 0).unwrap(),
            word_cloud: Vec::<WordCloudItem>::new(),
            summary: String::new(),
        }
    }

    fn signed_in() -> AppState {
        let user = User {
            id: "u-1".to_string(),
            email: "al@x.com".to_string(),
            name: "Al".to_string(),
        };
        AppState::new().reduce(StateAction::SessionEstablished(Session::authenticated(
            user, "tok",
        )))
    }

    #[test]
    fn test_new() {
        let state = AppState::new();
        assert!(!state.session.is_authenticated());
        assert!(state.datasets.is_empty());
        assert!(state.nlp_results.is_none());
        assert!(state.model_metrics.is_empty());
        assert!(!state.is_busy());
    }

    #[test]
    fn test_session_cleared_resets_scoped_state() {
        let state = signed_in();
        let epoch = state.session_epoch;
        let state = state
            .reduce(StateAction::DatasetAdded {
                dataset: dataset("a"),
                epoch,
            })
            .reduce(StateAction::NlpResultsReplaced {
                results: results("a"),
                epoch,
            })
            .reduce(StateAction::ModelMetricsReplaced {
                metrics: vec![],
                epoch,
            })
            .reduce(StateAction::RegistrationRecorded(
                PendingRegistration::registered("al@x.com"),
            ))
            .reduce(StateAction::SessionCleared);

        assert!(!state.session.is_authenticated());
        assert!(state.session.token().is_none());
        assert!(state.datasets.is_empty());
        assert!(state.nlp_results.is_none());
        assert!(state.model_metrics.is_empty());
        assert!(state.registration.is_none());
    }

    #[test]
    fn test_registration_record_is_replaced() {
        let pending = PendingRegistration::registered("al@x.com");
        let state = AppState::new()
            .reduce(StateAction::RegistrationRecorded(pending.clone()))
            .reduce(StateAction::RegistrationRecorded(pending.logged_in()));

        let registration = state.registration.unwrap();
        assert_eq!(registration.email, "al@x.com");
        assert!(!registration.is_pending());
    }

    #[test]
    fn test_dataset_added_keeps_upload_order() {
        let state = AppState::new()
            .reduce(StateAction::DatasetAdded {
                dataset: dataset("a"),
                epoch: 0,
            })
            .reduce(StateAction::DatasetAdded {
                dataset: dataset("b"),
                epoch: 0,
            });
        let ids: Vec<_> = state.datasets.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_datasets_replaced_is_full_replace() {
        let state = AppState::new()
            .reduce(StateAction::DatasetAdded {
                dataset: dataset("a"),
                epoch: 0,
            })
            .reduce(StateAction::DatasetsReplaced {
                datasets: vec![dataset("c")],
                epoch: 0,
            });
        assert_eq!(state.datasets.len(), 1);
        assert_eq!(state.datasets[0].id, "c");
    }

    #[test]
    fn test_nlp_results_overwritten() {
        let state = AppState::new()
            .reduce(StateAction::NlpResultsReplaced {
                results: results("a"),
                epoch: 0,
            })
            .reduce(StateAction::NlpResultsReplaced {
                results: results("b"),
                epoch: 0,
            });
        assert_eq!(state.nlp_results.unwrap().dataset_id, "b");
    }

    #[test]
    fn test_results_from_an_ended_session_are_dropped() {
        let state = signed_in();
        let started_in = state.session_epoch;

        let state = state.reduce(StateAction::SessionCleared);
        assert_ne!(state.session_epoch, started_in);

        let state = state
            .reduce(StateAction::DatasetAdded {
                dataset: dataset("late"),
                epoch: started_in,
            })
            .reduce(StateAction::DatasetsReplaced {
                datasets: vec![dataset("late")],
                epoch: started_in,
            })
            .reduce(StateAction::NlpResultsReplaced {
                results: results("late"),
                epoch: started_in,
            })
            .reduce(StateAction::ModelMetricsReplaced {
                metrics: vec![ModelMetric {
                    model_name: "SVM".to_string(),
                    accuracy: 0.9,
                    precision: 0.9,
                    recall: 0.9,
                    f1_score: 0.9,
                    confusion_matrix: Default::default(),
                }],
                epoch: started_in,
            });

        assert!(state.datasets.is_empty());
        assert!(state.nlp_results.is_none());
        assert!(state.model_metrics.is_empty());
    }

    #[test]
    fn test_new_session_bumps_epoch() {
        let state = signed_in();
        let first = state.session_epoch;
        let state = state
            .reduce(StateAction::SessionCleared)
            .reduce(StateAction::SessionEstablished(Session::anonymous()));
        assert_eq!(state.session_epoch, first + 2);
    }

    #[test]
    fn test_operation_started_only_when_idle() {
        let state = AppState::new()
            .reduce(StateAction::OperationStarted {
                operation: Operation::Upload,
                ticket: 1,
            })
            .reduce(StateAction::OperationStarted {
                operation: Operation::Analysis,
                ticket: 2,
            });
        assert!(state.busy.is_held_by(1));
        assert_eq!(state.busy.operation(), Some(Operation::Upload));
    }

    #[test]
    fn test_operation_finished_requires_matching_ticket() {
        let state = AppState::new().reduce(StateAction::OperationStarted {
            operation: Operation::Analysis,
            ticket: 5,
        });

        let state = state.reduce(StateAction::OperationFinished { ticket: 4 });
        assert!(state.is_busy());

        let state = state.reduce(StateAction::OperationFinished { ticket: 5 });
        assert!(!state.is_busy());
    }

    #[test]
    fn test_notices_are_bounded() {
        let mut state = AppState::new();
        for i in 0..(MAX_NOTICES + 3) {
            state = state.reduce(StateAction::NoticePosted(Notice::info(format!("n{i}"))));
        }
        assert_eq!(state.notices.len(), MAX_NOTICES);
        assert_eq!(state.notices[0].message, "n3");

        let state = state.reduce(StateAction::NoticesDismissed);
        assert!(state.notices.is_empty());
    }
}
