use anyhow::Result;
use sentilytics_core::analysis::Sentiment;
use serde_json::json;

use super::Output;
use super::datasets::require_session;
use crate::bootstrap::App;

pub async fn run(app: &App, output: &Output, id: &str) -> Result<()> {
    require_session(app)?;
    let report = app.store.run_analysis(id).await?;
    let results = app.store.nlp_results();
    let metrics = app.store.model_metrics();

    let value = json!({
        "report": report,
        "nlpResults": results,
        "modelMetrics": metrics,
    });

    output.emit(&value, || {
        if let Some(results) = &results {
            let stats = &results.stats;
            println!("Sentiment over {} rows", stats.total);
            for (label, sentiment, count) in [
                ("positive", Sentiment::Positive, stats.positive),
                ("negative", Sentiment::Negative, stats.negative),
                ("neutral", Sentiment::Neutral, stats.neutral),
            ] {
                println!(
                    "  {label:<9}{count:>6}  ({:.1}%)",
                    stats.ratio(sentiment) * 100.0
                );
            }
            if !results.summary.is_empty() {
                println!();
                println!("{}", results.summary);
            }
            let top: Vec<_> = results
                .word_cloud
                .iter()
                .take(10)
                .map(|w| w.text.as_str())
                .collect();
            if !top.is_empty() {
                println!();
                println!("Top terms: {}", top.join(", "));
            }
        }

        println!();
        println!(
            "{:<24}{:>9}{:>10}{:>8}{:>8}",
            "model", "accuracy", "precision", "recall", "f1"
        );
        for metric in &metrics {
            println!(
                "{:<24}{:>9.3}{:>10.3}{:>8.3}{:>8.3}",
                metric.model_name, metric.accuracy, metric.precision, metric.recall, metric.f1_score
            );
        }
    })
}
