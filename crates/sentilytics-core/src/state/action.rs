//! State transitions.

use crate::analysis::{ModelMetric, NlpResults};
use crate::dataset::Dataset;
use crate::session::{PendingRegistration, Session};

use super::busy::Operation;
use super::notice::Notice;

/// A single change to [`AppState`](super::AppState).
#[derive(Debug, Clone, PartialEq)]
pub enum StateAction {
    /// A login or session restore succeeded.
    SessionEstablished(Session),
    /// Logout or failed restore: the session and everything scoped to it is dropped.
    SessionCleared,
    /// Replaces the latest registration record.
    RegistrationRecorded(PendingRegistration),
    /// Appends one uploaded dataset.
    ///
    /// The session-scoped actions carry the `session_epoch` observed when the
    /// work started and are dropped if the session changed since.
    DatasetAdded { dataset: Dataset, epoch: u64 },
    /// Replaces the whole collection.
    DatasetsReplaced { datasets: Vec<Dataset>, epoch: u64 },
    NlpResultsReplaced { results: NlpResults, epoch: u64 },
    ModelMetricsReplaced { metrics: Vec<ModelMetric>, epoch: u64 },
    /// Takes the busy state if it is idle; otherwise a no-op.
    OperationStarted { operation: Operation, ticket: u64 },
    /// Releases the busy state if `ticket` still holds it; otherwise a no-op.
    OperationFinished { ticket: u64 },
    NoticePosted(Notice),
    NoticesDismissed,
}
