//! Sequential dual-provider feedback collection.

use tracing::{info, warn};

use crate::feedback::{reconcile, ProviderOutcome, ReconciledFeedback};
use crate::llm_client::TextProvider;
use crate::normalize::{normalize_feedback, Normalized};

/// Sends `prompt` to Gemini, then to Cohere, and reconciles both results.
///
/// Never fails: provider errors and malformed output become sentinel values. The second
/// call starts only after the first completes.
pub async fn collect_dual_feedback(
    gemini: &dyn TextProvider,
    cohere: &dyn TextProvider,
    prompt: &str,
) -> ReconciledFeedback {
    let gemini_outcome = request_feedback(gemini, prompt).await;
    let cohere_outcome = request_feedback(cohere, prompt).await;
    reconcile(gemini_outcome, cohere_outcome)
}

async fn request_feedback(provider: &dyn TextProvider, prompt: &str) -> ProviderOutcome {
    let name = provider.provider();
    match provider.complete(prompt).await {
        Ok(raw) => {
            let normalized = normalize_feedback(&raw);
            match &normalized {
                Normalized::Parsed(fb) => {
                    info!(provider = name.key(), "{name} feedback parsed (rating {:?})", fb.rating)
                }
                Normalized::Fallback { reason, .. } => warn!(
                    provider = name.key(),
                    "{name} feedback unusable, storing fallback: {reason}"
                ),
            }
            ProviderOutcome::Responded(normalized)
        }
        Err(e) => {
            warn!(provider = name.key(), "{name} feedback request failed: {e}");
            ProviderOutcome::Failed(e.to_string())
        }
    }
}
