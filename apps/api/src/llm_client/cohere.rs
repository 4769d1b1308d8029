//! Cohere `generate` client. Secondary provider, used only for answer feedback.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{send_with_retry, LlmError, Provider, RetryPolicy, TextProvider};

const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f32 = 0.7;

/// Text substituted when the response carries no generation text.
pub const NO_GENERATION_TEXT: &str = "Error: No valid feedback received.";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
pub struct Generation {
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Trimmed `generations[0].text`, or [`NO_GENERATION_TEXT`] when missing or blank.
    pub fn text(&self) -> String {
        self.generations
            .first()
            .and_then(|g| g.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(NO_GENERATION_TEXT)
            .to_string()
    }
}

#[derive(Clone)]
pub struct CohereClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    api_base: String,
    retry: RetryPolicy,
}

impl CohereClient {
    pub fn new(
        client: Client,
        api_key: Option<String>,
        model: String,
        api_base: String,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            api_key,
            model,
            api_base: api_base.trim_end_matches('/').to_string(),
            retry,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextProvider for CohereClient {
    fn provider(&self) -> Provider {
        Provider::Cohere
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey {
            provider: Provider::Cohere,
        })?;

        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            format: "json",
        };
        let url = format!("{}/v1/generate", self.api_base);

        let body = send_with_retry(Provider::Cohere, &self.retry, || {
            self.client
                .post(&url)
                .bearer_auth(api_key)
                .json(&request_body)
        })
        .await?;

        let response: GenerateResponse = serde_json::from_str(&body)?;
        Ok(response.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_request_body_shape() {
        let request = GenerateRequest {
            model: "command",
            prompt: "rate this",
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            format: "json",
        };
        let value: Value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "command");
        assert_eq!(value["prompt"], "rate this");
        assert_eq!(value["max_tokens"], 300);
        assert_eq!(value["format"], "json");
        assert!((value["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_generation_text_is_trimmed() {
        let body = r#"{"generations":[{"text":"  {\"rating\":7,\"feedback\":\"Good but vague\"}\n"}]}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.text(),
            r#"{"rating":7,"feedback":"Good but vague"}"#
        );
    }

    #[test]
    fn test_missing_generations_uses_placeholder() {
        let response: GenerateResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(response.text(), NO_GENERATION_TEXT);

        let response: GenerateResponse =
            serde_json::from_str(r#"{"generations":[{"text":"   "}]}"#).unwrap();
        assert_eq!(response.text(), NO_GENERATION_TEXT);
    }

    #[test]
    fn test_generation_body_normalizes_to_rating_and_feedback() {
        use crate::normalize::{normalize_feedback, Normalized, ProviderFeedback, Rating};

        let body = r#"{"generations":[{"text":"{\"rating\":7,\"feedback\":\"Good but vague\"}"}]}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            normalize_feedback(&response.text()),
            Normalized::Parsed(ProviderFeedback {
                rating: Rating::from(7),
                feedback: "Good but vague".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let client = CohereClient::new(
            Client::new(),
            None,
            "command".to_string(),
            "http://127.0.0.1:9".to_string(),
            RetryPolicy::with_max_attempts(1),
        );
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::MissingApiKey {
                provider: Provider::Cohere
            }
        ));
    }
}
