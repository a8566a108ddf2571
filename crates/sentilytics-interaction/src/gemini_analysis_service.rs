//! GeminiAnalysisService - Gemini REST API implementation of [`AnalysisService`].
//!
//! Both analysis calls send the dataset text with an instruction prompt and
//! ask Gemini for a JSON-only answer, which is then parsed and validated.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use sentilytics_core::analysis::{AnalysisService, ModelMetric, SentimentAnalysis};
use sentilytics_core::config::{AnalysisSettings, DEFAULT_GEMINI_BASE_URL};
use sentilytics_core::secret::SecretService;
use sentilytics_core::{Result, SentilyticsError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::prompts;
use crate::response::{parse_metrics, parse_sentiment};

/// Environment variable that overrides the API key from secret.json.
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// [`AnalysisService`] that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiAnalysisService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiAnalysisService {
    /// Creates a new service with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }

    /// Builds the service from config.toml settings and secret.json.
    ///
    /// The API key comes from `GEMINI_API_KEY` when set, otherwise from the
    /// `gemini` section of secret.json. The model from secret.json, when
    /// present, wins over `analysis.model`.
    pub async fn from_settings(
        settings: &AnalysisSettings,
        secrets: &dyn SecretService,
    ) -> Result<Self> {
        let gemini = secrets
            .load_secrets()
            .await?
            .gemini;

        let api_key = std::env::var(API_KEY_ENV_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| gemini.as_ref().map(|g| g.api_key.clone()))
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                SentilyticsError::config(format!(
                    "Gemini API key not configured (set {} or fill secret.json)",
                    API_KEY_ENV_VAR
                ))
            })?;

        let model = gemini
            .and_then(|g| g.model_name)
            .unwrap_or_else(|| settings.model.clone());

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| SentilyticsError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_json(&self, prompt: String) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature: 0.2,
            },
        };

        self.send_request(&request).await
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                // reqwest errors may embed the URL; strip it so the key never leaks
                SentilyticsError::analysis(format!(
                    "Gemini API request failed: {}",
                    err.without_url()
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            SentilyticsError::analysis(format!(
                "Failed to parse Gemini response: {}",
                err.without_url()
            ))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl AnalysisService for GeminiAnalysisService {
    async fn analyze_sentiment(&self, raw_text: &str) -> Result<SentimentAnalysis> {
        tracing::debug!(
            model = %self.model,
            chars = raw_text.len(),
            "[GeminiAnalysisService] Requesting sentiment analysis"
        );
        let text = self.generate_json(prompts::sentiment_prompt(raw_text)).await?;
        parse_sentiment(&text)
    }

    async fn generate_metrics(&self, raw_text: &str) -> Result<Vec<ModelMetric>> {
        tracing::debug!(
            model = %self.model,
            chars = raw_text.len(),
            "[GeminiAnalysisService] Requesting model metrics"
        );
        let text = self.generate_json(prompts::metrics_prompt(raw_text)).await?;
        parse_metrics(&text)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            SentilyticsError::analysis("Gemini API returned no text in the response candidates")
        })
}

fn map_http_error(status: StatusCode, body: String) -> SentilyticsError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    SentilyticsError::analysis(format!("Gemini API returned {}: {}", status.as_u16(), message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentilytics_core::config::SecretConfig;

    struct StaticSecrets(SecretConfig);

    #[async_trait]
    impl SecretService for StaticSecrets {
        async fn load_secrets(&self) -> Result<SecretConfig> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_extract_text_takes_first_text_part() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{}},{"text":"{}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), "{}");
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(extract_text_response(response).unwrap_err().is_analysis());
    }

    #[test]
    fn test_map_http_error_uses_api_message() {
        let err = map_http_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#
                .to_string(),
        );
        let text = err.to_string();
        assert!(text.contains("400"));
        assert!(text.contains("INVALID_ARGUMENT: API key not valid"));
    }

    #[test]
    fn test_map_http_error_plain_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature: 0.2,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_from_settings_prefers_secret_model() {
        let secrets = StaticSecrets(SecretConfig {
            gemini: Some(sentilytics_core::config::GeminiConfig {
                api_key: "key".to_string(),
                model_name: Some("gemini-2.5-pro".to_string()),
            }),
        });

        if std::env::var(API_KEY_ENV_VAR).is_ok() {
            // Environment override would mask the secret-file key
            return;
        }

        let service = GeminiAnalysisService::from_settings(&AnalysisSettings::default(), &secrets)
            .await
            .unwrap();
        assert_eq!(service.model(), "gemini-2.5-pro");
        assert_eq!(service.api_key, "key");
    }

    #[tokio::test]
    async fn test_from_settings_without_key() {
        if std::env::var(API_KEY_ENV_VAR).is_ok() {
            return;
        }
        let secrets = StaticSecrets(SecretConfig::default());
        let result =
            GeminiAnalysisService::from_settings(&AnalysisSettings::default(), &secrets).await;
        assert!(matches!(result, Err(SentilyticsError::Config(_))));
    }
}
