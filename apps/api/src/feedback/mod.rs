//! Dual-provider feedback: prompt, sequential provider calls, reconciliation into the
//! persisted `{gemini, cohere}` maps, and read-time aggregation.
//!
//! All provider calls go through `llm_client`; no direct HTTP calls here.

pub mod prompts;
pub mod rating;
pub mod service;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::Provider;
use crate::normalize::{strip_code_fences, Normalized, ProviderFeedback, Rating};

/// Feedback text used when a provider call itself failed.
pub const PROVIDER_ERROR_FEEDBACK: &str = "Error processing feedback.";
/// Feedback text shown when a stored map has no entry for a provider.
pub const NO_FEEDBACK_AVAILABLE: &str = "No feedback available";

/// What came back from one provider for one answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    Responded(Normalized<ProviderFeedback>),
    Failed(String),
}

/// Persisted `feedback` column. At most the two provider keys; a missing key means the
/// provider's feedback is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedbackMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cohere: Option<String>,
}

/// Persisted `rating` column, same key rules as [`FeedbackMap`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatingMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cohere: Option<Rating>,
}

impl FeedbackMap {
    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Gemini => self.gemini.as_deref(),
            Provider::Cohere => self.cohere.as_deref(),
        }
    }

    /// Display text for a provider, with the "No feedback available" placeholder.
    pub fn text_for(&self, provider: Provider) -> String {
        self.get(provider)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(NO_FEEDBACK_AVAILABLE)
            .to_string()
    }
}

impl RatingMap {
    pub fn get(&self, provider: Provider) -> Option<&Rating> {
        match provider {
            Provider::Gemini => self.gemini.as_ref(),
            Provider::Cohere => self.cohere.as_ref(),
        }
    }

    /// Display rating for a provider, `"N/A"` when absent.
    pub fn rating_for(&self, provider: Provider) -> Rating {
        self.get(provider).cloned().unwrap_or_else(Rating::unavailable)
    }
}

/// The combined record written for one answer. No cross-provider averaging here.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledFeedback {
    pub feedback: FeedbackMap,
    pub rating: RatingMap,
}

impl ReconciledFeedback {
    /// Text forms of the `feedback` and `rating` columns.
    pub fn encode(&self) -> Result<(String, String), serde_json::Error> {
        Ok((
            serde_json::to_string(&self.feedback)?,
            serde_json::to_string(&self.rating)?,
        ))
    }
}

/// Merges both providers' outcomes, substituting sentinels for anything unusable.
pub fn reconcile(gemini: ProviderOutcome, cohere: ProviderOutcome) -> ReconciledFeedback {
    let gemini = resolve(Provider::Gemini, gemini);
    let cohere = resolve(Provider::Cohere, cohere);

    ReconciledFeedback {
        feedback: FeedbackMap {
            gemini: Some(gemini.feedback),
            cohere: Some(cohere.feedback),
        },
        rating: RatingMap {
            gemini: Some(gemini.rating),
            cohere: Some(cohere.rating),
        },
    }
}

/// Collapses one outcome into a storable `{rating, feedback}`.
///
/// Fallback text differs per provider: Gemini keeps the raw text as-is, Cohere prefixes
/// it with `Raw response: `.
pub fn resolve(provider: Provider, outcome: ProviderOutcome) -> ProviderFeedback {
    match outcome {
        ProviderOutcome::Responded(Normalized::Parsed(parsed)) => parsed,
        ProviderOutcome::Responded(Normalized::Fallback { raw_text, .. }) => {
            let feedback = if raw_text.is_empty() {
                format!("{provider} AI feedback unavailable")
            } else {
                match provider {
                    Provider::Gemini => raw_text,
                    Provider::Cohere => format!("Raw response: {raw_text}"),
                }
            };
            ProviderFeedback {
                rating: Rating::unavailable(),
                feedback,
            }
        }
        ProviderOutcome::Failed(_) => ProviderFeedback {
            rating: Rating::unavailable(),
            feedback: PROVIDER_ERROR_FEEDBACK.to_string(),
        },
    }
}

/// Decodes a stored `feedback` column. Undecodable blobs degrade to an empty map.
pub fn decode_feedback_column(text: Option<&str>) -> FeedbackMap {
    decode_column(text, "feedback")
}

/// Decodes a stored `rating` column. Undecodable blobs degrade to an empty map.
pub fn decode_rating_column(text: Option<&str>) -> RatingMap {
    decode_column(text, "rating")
}

fn decode_column<T>(text: Option<&str>, column: &str) -> T
where
    T: Default + for<'de> Deserialize<'de>,
{
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return T::default();
    };
    let cleaned = strip_code_fences(text);
    serde_json::from_str(&cleaned).unwrap_or_else(|e| {
        warn!("Failed to decode stored {column} column: {e}");
        T::default()
    })
}
