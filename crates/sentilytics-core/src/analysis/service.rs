//! External analysis service contract.

use async_trait::async_trait;

use super::model::{ModelMetric, SentimentAnalysis};
use crate::error::Result;

/// Remote natural-language / metrics generation service.
///
/// Both calls take unbounded text and may be slow or fail. Callers do not
/// retry: one failed attempt ends the invocation.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Classifies the text and returns counts, weighted terms and a summary.
    async fn analyze_sentiment(&self, raw_text: &str) -> Result<SentimentAnalysis>;

    /// Returns quality figures for several named classifiers.
    async fn generate_metrics(&self, raw_text: &str) -> Result<Vec<ModelMetric>>;
}
