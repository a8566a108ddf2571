//! Prompt templates for the analysis calls.

const SENTIMENT_INSTRUCTIONS: &str = r#"You are a sentiment analysis engine. The text below is a CSV dataset; every data row is one unit to classify.
Classify each row as positive, negative or neutral and answer with a single JSON object of this exact shape:
{
  "stats": {"positive": <int>, "negative": <int>, "neutral": <int>, "total": <int>},
  "wordCloud": [{"text": <term>, "value": <positive number weight>, "sentiment": "positive" | "negative" | "neutral"}],
  "summary": <two or three sentences describing the overall sentiment>
}
Return at most 40 word cloud terms, the most significant first. Do not add any text outside the JSON."#;

const METRICS_INSTRUCTIONS: &str = r#"You are a machine learning evaluation engine. The text below is a CSV dataset of labelled or unlabelled text.
Estimate how the following classifiers would perform on sentiment classification of this data: Logistic Regression, Naive Bayes, Support Vector Machine, Random Forest.
Answer with a JSON array, one object per classifier, of this exact shape:
[{"modelName": <string>, "accuracy": <0..1>, "precision": <0..1>, "recall": <0..1>, "f1Score": <0..1>, "confusionMatrix": {"tp": <int>, "tn": <int>, "fp": <int>, "fn": <int>}}]
Do not add any text outside the JSON."#;

/// Builds the sentiment request for `raw_text`.
pub fn sentiment_prompt(raw_text: &str) -> String {
    format!("{SENTIMENT_INSTRUCTIONS}\n\nDATASET:\n{raw_text}")
}

/// Builds the model metrics request for `raw_text`.
pub fn metrics_prompt(raw_text: &str) -> String {
    format!("{METRICS_INSTRUCTIONS}\n\nDATASET:\n{raw_text}")
}
