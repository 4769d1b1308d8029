//! Session-driven answer flows shared by the typed and recorded endpoints.
//!
//! Provider and database work runs in a spawned task that settles the session itself, so a
//! dropped request (client disconnect) still brings the session back to `Idle`.

use std::future::Future;

use bytes::Bytes;
use serde::Serialize;
use tracing::{error, warn};

use crate::answers::service::{submit_answer, AnswerFeedbackView};
use crate::answers::session::{AnswerSession, SessionKey, SessionState};
use crate::errors::AppError;
use crate::models::answer::UserAnswerRow;
use crate::models::interview::MockInterviewRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RecordingResponse {
    pub state: SessionState,
    pub buffer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted: Option<AnswerFeedbackView>,
}

impl RecordingResponse {
    pub fn from_session(session: &AnswerSession) -> Self {
        Self {
            state: session.state(),
            buffer: session.buffer().to_string(),
            transcript: None,
            submitted: None,
        }
    }
}

/// Replaces the question's buffer with a typed answer and submits it.
pub async fn submit_typed_answer(
    state: &AppState,
    key: SessionKey,
    interview: MockInterviewRow,
    user_answer: &str,
) -> Result<UserAnswerRow, AppError> {
    let answer = state
        .sessions
        .with_session(&key, |session| {
            session.replace_buffer(user_answer)?;
            session.begin_submission()
        })
        .await?;

    run_detached(
        state,
        &key,
        submit_and_settle(state.clone(), key.clone(), interview, answer),
    )
    .await
}

/// Finishes a recording: transcribe, append to the buffer, and submit once the buffer is
/// long enough.
pub async fn process_recording(
    state: &AppState,
    key: SessionKey,
    interview: MockInterviewRow,
    audio: Bytes,
    mime_type: String,
) -> Result<RecordingResponse, AppError> {
    state
        .sessions
        .with_session(&key, |session| session.stop_recording())
        .await?;

    let (transcript, submitted) = run_detached(
        state,
        &key,
        transcribe_and_submit(state.clone(), key.clone(), interview, audio, mime_type),
    )
    .await?;

    let session = state.sessions.snapshot(&key).await;
    Ok(RecordingResponse {
        transcript: Some(transcript),
        submitted: submitted.as_ref().map(AnswerFeedbackView::from_row),
        ..RecordingResponse::from_session(&session)
    })
}

async fn transcribe_and_submit(
    state: AppState,
    key: SessionKey,
    interview: MockInterviewRow,
    audio: Bytes,
    mime_type: String,
) -> Result<(String, Option<UserAnswerRow>), AppError> {
    let transcript = match state.transcriber.transcribe(&audio, &mime_type).await {
        Ok(text) => text,
        Err(e) => {
            warn!(
                "Transcription failed for {} question {}: {e}",
                key.mock_id, key.question_index
            );
            state
                .sessions
                .with_session(&key, |session| session.transcription_failed())
                .await;
            return Err(e.into());
        }
    };

    let pending = state
        .sessions
        .with_session(&key, |session| {
            session.transcription_finished(&transcript)?;
            if session.ready_for_submission() {
                session.begin_submission().map(Some)
            } else {
                Ok(None)
            }
        })
        .await?;

    let submitted = match pending {
        Some(answer) => Some(submit_and_settle(state, key, interview, answer).await?),
        None => None,
    };

    Ok((transcript, submitted))
}

/// Runs a submission already moved to `Submitting` and settles the session either way.
async fn submit_and_settle(
    state: AppState,
    key: SessionKey,
    interview: MockInterviewRow,
    answer: String,
) -> Result<UserAnswerRow, AppError> {
    let result = submit_answer(
        &state.db,
        state.gemini.as_ref(),
        state.cohere.as_ref(),
        &interview,
        key.question_index,
        &answer,
        &key.user_email,
    )
    .await;

    state
        .sessions
        .with_session(&key, |session| match &result {
            Ok(_) => session.submission_succeeded(),
            Err(_) => session.submission_failed(),
        })
        .await;

    result
}

/// Spawns `work` so it outlives the request. A panicked task still releases the session.
async fn run_detached<T, F>(state: &AppState, key: &SessionKey, work: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(result) => result,
        Err(e) => {
            error!(
                "Answer task for {} question {} did not finish: {e}",
                key.mock_id, key.question_index
            );
            state
                .sessions
                .with_session(key, AnswerSession::abandon_in_flight)
                .await;
            Err(AppError::Internal(anyhow::anyhow!("Answer task failed: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::llm_client::{LlmError, Provider, TextProvider, Transcriber};
    use crate::state::testing::{test_config, test_state};

    /// Replies with fixed text after an optional delay, counting calls.
    struct CannedProvider {
        provider: Provider,
        reply: Result<&'static str, ()>,
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl CannedProvider {
        fn new(provider: Provider, reply: Result<&'static str, ()>) -> Self {
            Self {
                provider,
                reply,
                delay: Duration::ZERO,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        async fn answer(&self) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reply
                .map(str::to_string)
                .map_err(|_| LlmError::Api {
                    status: 500,
                    message: "down".to_string(),
                })
        }
    }

    #[async_trait]
    impl TextProvider for CannedProvider {
        fn provider(&self) -> Provider {
            self.provider
        }

        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            self.answer().await
        }
    }

    #[async_trait]
    impl Transcriber for CannedProvider {
        async fn transcribe(&self, _audio: &[u8], _mime_type: &str) -> Result<String, LlmError> {
            self.answer().await
        }
    }

    const FEEDBACK: &str = r#"{"rating": 6, "feedback": "Name the complexity"}"#;

    struct Harness {
        state: AppState,
        gemini_calls: Arc<AtomicUsize>,
        cohere_calls: Arc<AtomicUsize>,
        transcribe_calls: Arc<AtomicUsize>,
    }

    fn harness(transcriber: CannedProvider, feedback_delay: Duration) -> Harness {
        let gemini = CannedProvider::new(Provider::Gemini, Ok(FEEDBACK)).slow(feedback_delay);
        let cohere = CannedProvider::new(Provider::Cohere, Ok(FEEDBACK)).slow(feedback_delay);
        let (gemini_calls, cohere_calls) = (gemini.calls.clone(), cohere.calls.clone());
        let transcribe_calls = transcriber.calls.clone();

        Harness {
            state: test_state(
                test_config(),
                Arc::new(gemini),
                Arc::new(cohere),
                Arc::new(transcriber),
            ),
            gemini_calls,
            cohere_calls,
            transcribe_calls,
        }
    }

    fn interview() -> MockInterviewRow {
        MockInterviewRow {
            id: 1,
            mock_id: Uuid::nil(),
            json_mock_resp: r#"[{"Question":"How do you find the k largest items?","Answer":"Use a heap."}]"#
                .to_string(),
            job_position: "Backend Engineer".to_string(),
            job_desc: "Rust".to_string(),
            job_experience: "4".to_string(),
            created_by: "dev@example.com".to_string(),
            created_at: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        }
    }

    fn key() -> SessionKey {
        SessionKey {
            user_email: "dev@example.com".to_string(),
            mock_id: Uuid::nil(),
            question_index: 0,
        }
    }

    async fn start_recording(state: &AppState, key: &SessionKey) {
        state
            .sessions
            .with_session(key, |s| s.start_recording())
            .await
            .unwrap();
    }

    async fn stop(state: &AppState) -> Result<RecordingResponse, AppError> {
        process_recording(
            state,
            key(),
            interview(),
            Bytes::from_static(b"fake-webm"),
            "audio/webm".to_string(),
        )
        .await
    }

    /// Polls until the session is back to `Idle` or a few seconds pass.
    async fn settled(state: &AppState, key: &SessionKey) -> AnswerSession {
        for _ in 0..150 {
            let session = state.sessions.snapshot(key).await;
            if session.state() == SessionState::Idle {
                return session;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        state.sessions.snapshot(key).await
    }

    #[tokio::test]
    async fn test_short_transcript_waits_in_buffer() {
        let h = harness(
            CannedProvider::new(Provider::Gemini, Ok("  a heap  ")),
            Duration::ZERO,
        );
        start_recording(&h.state, &key()).await;

        let response = stop(&h.state).await.unwrap();
        assert_eq!(response.state, SessionState::Idle);
        assert_eq!(response.buffer, "a heap");
        assert_eq!(response.transcript.as_deref(), Some("  a heap  "));
        assert!(response.submitted.is_none());
        assert_eq!(h.gemini_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.cohere_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_threshold_triggers_submission_and_failure_keeps_buffer() {
        let h = harness(
            CannedProvider::new(Provider::Gemini, Ok("then pop k times")),
            Duration::ZERO,
        );
        h.state
            .sessions
            .with_session(&key(), |s| s.replace_buffer("Build a heap"))
            .await
            .unwrap();
        start_recording(&h.state, &key()).await;

        // Feedback is collected, then the insert fails against the unreachable database.
        let err = stop(&h.state).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(h.gemini_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.cohere_calls.load(Ordering::SeqCst), 1);

        let session = h.state.sessions.snapshot(&key()).await;
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.buffer(), "Build a heap then pop k times");
    }

    #[tokio::test]
    async fn test_failed_transcription_returns_to_idle() {
        let h = harness(CannedProvider::new(Provider::Gemini, Err(())), Duration::ZERO);
        h.state
            .sessions
            .with_session(&key(), |s| s.replace_buffer("kept"))
            .await
            .unwrap();
        start_recording(&h.state, &key()).await;

        let err = stop(&h.state).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));

        let session = h.state.sessions.snapshot(&key()).await;
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.buffer(), "kept");
    }

    #[tokio::test]
    async fn test_stop_without_start_is_conflict() {
        let h = harness(
            CannedProvider::new(Provider::Gemini, Ok("unused")),
            Duration::ZERO,
        );
        let err = stop(&h.state).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(h.transcribe_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dropped_submission_still_returns_to_idle() {
        let h = harness(
            CannedProvider::new(Provider::Gemini, Ok("unused")),
            Duration::from_millis(300),
        );

        let request = submit_typed_answer(
            &h.state,
            key(),
            interview(),
            "Keep a min-heap of size k",
        );
        assert!(tokio::time::timeout(Duration::from_millis(50), request)
            .await
            .is_err());
        assert_eq!(
            h.state.sessions.snapshot(&key()).await.state(),
            SessionState::Submitting
        );

        let session = settled(&h.state, &key()).await;
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.buffer(), "Keep a min-heap of size k");
        assert_eq!(h.cohere_calls.load(Ordering::SeqCst), 1);

        start_recording(&h.state, &key()).await;
    }

    #[tokio::test]
    async fn test_dropped_transcription_still_returns_to_idle() {
        let h = harness(
            CannedProvider::new(Provider::Gemini, Ok("a heap")).slow(Duration::from_millis(300)),
            Duration::ZERO,
        );
        start_recording(&h.state, &key()).await;

        assert!(tokio::time::timeout(Duration::from_millis(50), stop(&h.state))
            .await
            .is_err());

        let session = settled(&h.state, &key()).await;
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.buffer(), "a heap");
    }

    #[tokio::test]
    async fn test_typed_answer_too_short() {
        let h = harness(
            CannedProvider::new(Provider::Gemini, Ok("unused")),
            Duration::ZERO,
        );
        let err = submit_typed_answer(&h.state, key(), interview(), "a heap")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(h.gemini_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            h.state.sessions.snapshot(&key()).await.state(),
            SessionState::Idle
        );
    }
}
