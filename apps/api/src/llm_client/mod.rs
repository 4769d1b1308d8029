/// LLM Client: the single point of entry for all AI provider calls.
///
/// ARCHITECTURAL RULE: No other module may call Gemini or Cohere directly.
/// Handlers and services depend on the `TextProvider` / `Transcriber` traits,
/// which `AppState` carries as trait objects.
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod cohere;
pub mod gemini;
pub mod prompts;

pub use cohere::CohereClient;
pub use gemini::GeminiClient;

/// The two providers the service talks to. They are independent and not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Gemini,
    Cohere,
}

impl Provider {
    /// Key used for this provider inside persisted feedback/rating maps.
    pub fn key(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Cohere => "cohere",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => f.write_str("Gemini"),
            Provider::Cohere => f.write_str("Cohere"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider} API key is missing")]
    MissingApiKey { provider: Provider },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} attempts")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Bounded retry with exponential backoff for transport failures, 429 and 5xx.
/// Content problems are never retried here; they go through the normalizer's fallback.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based): base, 2*base, 4*base, ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay * (1u32 << exponent)
    }
}

/// A text-generation provider: prompt in, free text out.
#[async_trait]
pub trait TextProvider: Send + Sync {
    fn provider(&self) -> Provider;

    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// A speech-capable provider that turns one recorded audio object into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, LlmError>;
}

/// Builds the HTTP client shared by both providers.
pub fn build_http_client(timeout: Duration) -> Result<Client, LlmError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Sends the request built by `build` and returns the response body on 2xx.
/// Retries on transport errors, 429 and 5xx with exponential backoff.
pub(crate) async fn send_with_retry<F>(
    provider: Provider,
    policy: &RetryPolicy,
    build: F,
) -> Result<String, LlmError>
where
    F: Fn() -> RequestBuilder,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..max_attempts {
        if attempt > 0 {
            let delay = policy.delay_for(attempt);
            warn!(
                "{provider} call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match build().send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("{provider} transport error: {e}");
                last_error = Some(LlmError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status.as_u16() == 429 {
            warn!("{provider} API rate limited the request");
            last_error = Some(LlmError::RateLimited {
                retries: attempt + 1,
            });
            continue;
        }

        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("{provider} API returned {}: {}", status, body);
            last_error = Some(LlmError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        let body = response.text().await?;
        debug!("{provider} call succeeded: {} bytes", body.len());
        return Ok(body);
    }

    Err(last_error.unwrap_or(LlmError::RateLimited {
        retries: max_attempts,
    }))
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Pulls a readable message out of a provider error body.
/// Gemini nests it under `error.message`, Cohere puts it at the top level.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.and_then(|b| b.message).or(e.message))
        .unwrap_or_else(|| body.to_string())
}
