//! Parsing and validation of the JSON answers.

use sentilytics_core::analysis::{
    ModelMetric, Sentiment, SentimentAnalysis, SentimentStats, WordCloudItem,
};
use sentilytics_core::{Result, SentilyticsError};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentimentPayload {
    stats: StatsPayload,
    #[serde(default, alias = "word_cloud")]
    word_cloud: Vec<WordPayload>,
    #[serde(default)]
    summary: String,
}

#[derive(Deserialize)]
struct StatsPayload {
    positive: u64,
    negative: u64,
    neutral: u64,
    total: Option<u64>,
}

#[derive(Deserialize)]
struct WordPayload {
    text: String,
    value: f64,
    sentiment: Sentiment,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MetricsPayload {
    Bare(Vec<ModelMetric>),
    Wrapped { metrics: Vec<ModelMetric> },
}

/// Removes a Markdown code fence around the payload, if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parses a sentiment answer.
///
/// A `total` that disagrees with the three counts is replaced by their sum.
/// Word cloud items without a positive weight are dropped.
pub fn parse_sentiment(text: &str) -> Result<SentimentAnalysis> {
    let payload: SentimentPayload = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| SentilyticsError::analysis(format!("Malformed sentiment response: {e}")))?;

    let stats = SentimentStats::from_counts(
        payload.stats.positive,
        payload.stats.negative,
        payload.stats.neutral,
    )
    .ok_or_else(|| SentilyticsError::analysis("Sentiment counts overflow"))?;
    if let Some(reported) = payload.stats.total {
        if reported != stats.total {
            tracing::warn!(
                reported,
                computed = stats.total,
                "[GeminiAnalysisService] Sentiment total disagrees with counts, using sum"
            );
        }
    }

    let before = payload.word_cloud.len();
    let word_cloud: Vec<WordCloudItem> = payload
        .word_cloud
        .into_iter()
        .filter(|w| w.value.is_finite() && w.value > 0.0 && !w.text.trim().is_empty())
        .map(|w| WordCloudItem {
            text: w.text,
            value: w.value,
            sentiment: w.sentiment,
        })
        .collect();
    if word_cloud.len() < before {
        tracing::debug!(
            dropped = before - word_cloud.len(),
            "[GeminiAnalysisService] Dropped word cloud items without a positive weight"
        );
    }

    Ok(SentimentAnalysis {
        stats,
        word_cloud,
        summary: payload.summary.trim().to_string(),
    })
}

/// Parses a model metrics answer (a bare array or `{"metrics": [...]}`).
///
/// Any score outside `[0, 1]` rejects the whole answer.
pub fn parse_metrics(text: &str) -> Result<Vec<ModelMetric>> {
    let payload: MetricsPayload = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| SentilyticsError::analysis(format!("Malformed metrics response: {e}")))?;

    let metrics = match payload {
        MetricsPayload::Bare(metrics) | MetricsPayload::Wrapped { metrics } => metrics,
    };

    for metric in &metrics {
        if let Some(score) = metric.out_of_range_score() {
            return Err(SentilyticsError::analysis(format!(
                "Model '{}' reported {} outside [0, 1]",
                metric.model_name, score
            )));
        }
        if metric.confusion_matrix.total().is_none() {
            return Err(SentilyticsError::analysis(format!(
                "Model '{}' reported a confusion matrix that overflows",
                metric.model_name
            )));
        }
    }

    let mut seen = HashSet::new();
    for metric in &metrics {
        if !seen.insert(metric.model_name.as_str()) {
            tracing::warn!(
                model = %metric.model_name,
                "[GeminiAnalysisService] Duplicate model name in metrics response"
            );
        }
    }

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[]\n```\n"), "[]");
    }

    #[test]
    fn test_parse_sentiment() {
        let analysis = parse_sentiment(
            r#"{
                "stats": {"positive": 3, "negative": 1, "neutral": 1, "total": 5},
                "wordCloud": [
                    {"text": "great", "value": 12, "sentiment": "positive"},
                    {"text": "late", "value": 4.5, "sentiment": "negative"},
                    {"text": "great", "value": 2, "sentiment": "neutral"}
                ],
                "summary": " Mostly happy customers. "
            }"#,
        )
        .unwrap();

        assert_eq!(analysis.stats, SentimentStats::from_counts(3, 1, 1).unwrap());
        assert_eq!(analysis.word_cloud.len(), 3);
        assert_eq!(analysis.word_cloud[1].sentiment, Sentiment::Negative);
        assert_eq!(analysis.summary, "Mostly happy customers.");
    }

    #[test]
    fn test_parse_sentiment_fixes_total_and_drops_zero_weights() {
        let analysis = parse_sentiment(
            r#"```json
            {"stats": {"positive": 2, "negative": 2, "neutral": 0, "total": 9},
             "word_cloud": [{"text": "meh", "value": 0, "sentiment": "neutral"},
                            {"text": "ok", "value": 1, "sentiment": "neutral"}]}
            ```"#,
        )
        .unwrap();

        assert_eq!(analysis.stats.total, 4);
        assert!(analysis.stats.is_consistent());
        assert_eq!(analysis.word_cloud.len(), 1);
        assert_eq!(analysis.word_cloud[0].text, "ok");
        assert_eq!(analysis.summary, "");
    }

    #[test]
    fn test_parse_sentiment_rejects_overflowing_counts() {
        let err = parse_sentiment(
            r#"{"stats": {"positive": 18446744073709551615, "negative": 1, "neutral": 0},
                "wordCloud": [], "summary": "x"}"#,
        )
        .unwrap_err();
        assert!(err.is_analysis());
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn test_parse_metrics_rejects_overflowing_matrix() {
        let err = parse_metrics(
            r#"[{"modelName": "SVM", "accuracy": 0.8, "precision": 0.8, "recall": 0.7,
                "f1Score": 0.75,
                "confusionMatrix": {"tp": 18446744073709551615, "tn": 1, "fp": 0, "fn": 0}}]"#,
        )
        .unwrap_err();
        assert!(err.is_analysis());
    }

    #[test]
    fn test_parse_sentiment_rejects_garbage() {
        let err = parse_sentiment("I could not analyze this").unwrap_err();
        assert!(err.is_analysis());
    }

    #[test]
    fn test_parse_metrics_bare_and_wrapped() {
        let metric = r#"{"modelName": "Naive Bayes", "accuracy": 0.81, "precision": 0.8,
            "recall": 0.79, "f1Score": 0.795, "confusionMatrix": {"tp": 40, "tn": 41, "fp": 10, "fn": 9}}"#;

        let bare = parse_metrics(&format!("[{metric}]")).unwrap();
        assert_eq!(bare.len(), 1);
        assert_eq!(bare[0].confusion_matrix.fn_, 9);

        let wrapped = parse_metrics(&format!("{{\"metrics\": [{metric}]}}")).unwrap();
        assert_eq!(wrapped, bare);
    }

    #[test]
    fn test_parse_metrics_rejects_out_of_range() {
        let err = parse_metrics(
            r#"[{"modelName": "SVM", "accuracy": 81, "precision": 0.8, "recall": 0.7,
                "f1Score": 0.75, "confusionMatrix": {"tp": 1, "tn": 1, "fp": 0, "fn": 0}}]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("accuracy"));
    }
}
