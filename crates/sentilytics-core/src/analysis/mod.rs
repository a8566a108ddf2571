//! Analysis domain module.
//!
//! # Module Structure
//!
//! - `model`: Sentiment statistics, word cloud items, NLP results, model metrics
//! - `phase`: Per-run pipeline phases
//! - `service`: The external analysis service contract

mod model;
mod phase;
mod service;

pub use model::{
    ConfusionMatrix, ModelMetric, NlpResults, Sentiment, SentimentAnalysis, SentimentStats,
    WordCloudItem,
};
pub use phase::AnalysisPhase;
pub use service::AnalysisService;
