//! Analysis runs.

mod orchestrator;

pub use orchestrator::{ANALYSIS_FAILED_NOTICE, AnalysisOrchestrator, AnalysisReport};
