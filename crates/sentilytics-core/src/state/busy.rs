//! In-flight operation tracking.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation classes that share the busy state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Upload,
    Analysis,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Upload => f.write_str("upload"),
            Operation::Analysis => f.write_str("analysis"),
        }
    }
}

/// Whether an upload or analysis is in flight, and which one.
///
/// At most one operation holds the state at a time. Only the holder of the
/// matching `ticket` can release it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BusyState {
    #[default]
    Idle,
    Busy { operation: Operation, ticket: u64 },
}

impl BusyState {
    pub fn is_busy(&self) -> bool {
        matches!(self, BusyState::Busy { .. })
    }

    /// The operation currently holding the state.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            BusyState::Idle => None,
            BusyState::Busy { operation, .. } => Some(*operation),
        }
    }

    pub fn is_held_by(&self, ticket: u64) -> bool {
        matches!(self, BusyState::Busy { ticket: held, .. } if *held == ticket)
    }
}
