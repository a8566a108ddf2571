//! Analysis result models.

use serde::{Deserialize, Serialize};

/// Sentiment class of a classified unit or a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Counts of classified units.
///
/// Invariant: `positive + negative + neutral == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentStats {
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
    pub total: u64,
}

impl SentimentStats {
    /// Builds stats whose total is the sum of the three counts.
    ///
    /// Returns `None` when the sum does not fit in a `u64`.
    pub fn from_counts(positive: u64, negative: u64, neutral: u64) -> Option<Self> {
        let total = positive.checked_add(negative)?.checked_add(neutral)?;
        Some(Self {
            positive,
            negative,
            neutral,
            total,
        })
    }

    pub fn is_consistent(&self) -> bool {
        self.positive
            .checked_add(self.negative)
            .and_then(|sum| sum.checked_add(self.neutral))
            == Some(self.total)
    }

    /// Share of `sentiment` in `total`, or 0.0 for empty stats.
    pub fn ratio(&self, sentiment: Sentiment) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let count = match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        };
        count as f64 / self.total as f64
    }
}

/// A weighted term of the word cloud.
///
/// Terms are not deduplicated: the same text may appear with different tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCloudItem {
    pub text: String,
    /// Weight, strictly positive
    pub value: f64,
    pub sentiment: Sentiment,
}

/// What the analysis service returns for a sentiment request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentAnalysis {
    pub stats: SentimentStats,
    pub word_cloud: Vec<WordCloudItem>,
    pub summary: String,
}

impl SentimentAnalysis {
    /// Stamps the analysis with the dataset it was computed for.
    pub fn for_dataset(self, dataset_id: impl Into<String>) -> NlpResults {
        NlpResults {
            dataset_id: dataset_id.into(),
            stats: self.stats,
            word_cloud: self.word_cloud,
            summary: self.summary,
        }
    }
}

/// The sentiment/summary/word-weight output of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NlpResults {
    pub dataset_id: String,
    pub stats: SentimentStats,
    pub word_cloud: Vec<WordCloudItem>,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp: u64,
    pub tn: u64,
    pub fp: u64,
    #[serde(rename = "fn")]
    pub fn_: u64,
}

impl ConfusionMatrix {
    /// Sum of the four cells, or `None` on overflow.
    pub fn total(&self) -> Option<u64> {
        [self.tn, self.fp, self.fn_]
            .into_iter()
            .try_fold(self.tp, u64::checked_add)
    }
}

/// A named classifier's quality figures for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetric {
    /// e.g. "Logistic Regression", "Decision Tree"
    pub model_name: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion_matrix: ConfusionMatrix,
}

impl ModelMetric {
    /// Returns the name of the first score outside `[0, 1]`, if any.
    pub fn out_of_range_score(&self) -> Option<&'static str> {
        [
            ("accuracy", self.accuracy),
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1Score", self.f1_score),
        ]
        .into_iter()
        .find(|(_, score)| !(0.0..=1.0).contains(score))
        .map(|(name, _)| name)
    }
}
