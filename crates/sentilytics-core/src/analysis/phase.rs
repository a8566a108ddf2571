//! Phases of one analysis run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a single `run_analysis` invocation currently is.
///
/// `Idle → Fetching → AnalyzingSentiment → GeneratingMetrics → Done`,
/// or `Failed` from any of the working phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisPhase {
    Idle,
    Fetching,
    AnalyzingSentiment,
    GeneratingMetrics,
    Done,
    Failed,
}

impl AnalysisPhase {
    /// The phase that follows a successful step.
    pub fn next(self) -> Self {
        match self {
            Self::Idle => Self::Fetching,
            Self::Fetching => Self::AnalyzingSentiment,
            Self::AnalyzingSentiment => Self::GeneratingMetrics,
            Self::GeneratingMetrics => Self::Done,
            Self::Done | Self::Failed => self,
        }
    }
}

impl fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::AnalyzingSentiment => "analyzing-sentiment",
            Self::GeneratingMetrics => "generating-metrics",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_order() {
        let mut phase = AnalysisPhase::Idle;
        let mut seen = vec![phase];
        while phase != AnalysisPhase::Done {
            phase = phase.next();
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![
                AnalysisPhase::Idle,
                AnalysisPhase::Fetching,
                AnalysisPhase::AnalyzingSentiment,
                AnalysisPhase::GeneratingMetrics,
                AnalysisPhase::Done,
            ]
        );
    }

    #[test]
    fn test_failed_is_sticky() {
        assert_eq!(AnalysisPhase::Failed.next(), AnalysisPhase::Failed);
    }
}
