//! Per-question answer session.
//!
//! ```text
//! Idle ──start──▶ Recording ──stop──▶ Transcribing ──ok/err──▶ Idle
//!  ▲                                                            │
//!  └──────── succeeded/failed ◀── Submitting ◀── buffer > 10 ───┘
//! ```
//!
//! Transitions run under the store lock; transcription and feedback calls happen between
//! transitions, outside it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

/// An answer must be longer than this many characters to be submitted.
pub const MIN_ANSWER_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
    Transcribing,
    Submitting,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Transcribing => "transcribing",
            SessionState::Submitting => "submitting",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: SessionState,
    },

    #[error("Answer must be longer than {min} characters")]
    AnswerTooShort { min: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnswerSession {
    state: SessionState,
    buffer: String,
}

impl AnswerSession {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    fn require(&self, expected: SessionState, action: &'static str) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    /// Only one recording per question at a time.
    pub fn start_recording(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::Idle, "start recording")?;
        self.state = SessionState::Recording;
        Ok(())
    }

    pub fn stop_recording(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::Recording, "stop recording")?;
        self.state = SessionState::Transcribing;
        Ok(())
    }

    /// Appends the transcript to the buffer, single-space separated.
    pub fn transcription_finished(&mut self, transcript: &str) -> Result<(), SessionError> {
        self.require(SessionState::Transcribing, "finish transcription")?;
        let transcript = transcript.trim();
        if !transcript.is_empty() {
            if !self.buffer.is_empty() {
                self.buffer.push(' ');
            }
            self.buffer.push_str(transcript);
        }
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Buffer is left untouched.
    pub fn transcription_failed(&mut self) {
        if self.state == SessionState::Transcribing {
            self.state = SessionState::Idle;
        }
    }

    /// Overwrites the buffer with a typed answer.
    pub fn replace_buffer(&mut self, text: &str) -> Result<(), SessionError> {
        self.require(SessionState::Idle, "edit the answer")?;
        self.buffer = text.trim().to_string();
        Ok(())
    }

    pub fn ready_for_submission(&self) -> bool {
        self.state == SessionState::Idle && self.buffer.chars().count() > MIN_ANSWER_CHARS
    }

    /// Moves to `Submitting` and hands back the answer text to submit.
    pub fn begin_submission(&mut self) -> Result<String, SessionError> {
        self.require(SessionState::Idle, "submit")?;
        if self.buffer.chars().count() <= MIN_ANSWER_CHARS {
            return Err(SessionError::AnswerTooShort {
                min: MIN_ANSWER_CHARS,
            });
        }
        self.state = SessionState::Submitting;
        Ok(self.buffer.clone())
    }

    pub fn submission_succeeded(&mut self) {
        if self.state == SessionState::Submitting {
            self.buffer.clear();
            self.state = SessionState::Idle;
        }
    }

    /// Keeps the buffer so the user can retry.
    pub fn submission_failed(&mut self) {
        if self.state == SessionState::Submitting {
            self.state = SessionState::Idle;
        }
    }

    /// Returns an interrupted transcription or submission to `Idle`, keeping the buffer.
    pub fn abandon_in_flight(&mut self) {
        if matches!(
            self.state,
            SessionState::Transcribing | SessionState::Submitting
        ) {
            self.state = SessionState::Idle;
        }
    }

    fn is_pristine(&self) -> bool {
        self.state == SessionState::Idle && self.buffer.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub user_email: String,
    pub mock_id: Uuid,
    pub question_index: usize,
}

#[derive(Debug)]
struct StoredSession {
    session: AnswerSession,
    touched: Instant,
}

/// In-memory sessions shared across handlers.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<SessionKey, StoredSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the session for `key` under the lock, creating it if needed.
    /// Sessions that end up idle with an empty buffer are dropped.
    pub async fn with_session<R>(
        &self,
        key: &SessionKey,
        f: impl FnOnce(&mut AnswerSession) -> R,
    ) -> R {
        let mut sessions = self.sessions.lock().await;
        let stored = sessions.entry(key.clone()).or_insert_with(|| StoredSession {
            session: AnswerSession::default(),
            touched: Instant::now(),
        });
        let result = f(&mut stored.session);
        stored.touched = Instant::now();
        if stored.session.is_pristine() {
            sessions.remove(key);
        }
        result
    }

    pub async fn snapshot(&self, key: &SessionKey) -> AnswerSession {
        self.sessions
            .lock()
            .await
            .get(key)
            .map(|stored| stored.session.clone())
            .unwrap_or_default()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Drops sessions untouched for `max_idle`, whatever their state. Returns how many went.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, stored| now.duration_since(stored.touched) < max_idle);
        before - sessions.len()
    }

    /// Runs [`evict_idle`](Self::evict_idle) on a fixed period for the life of the process.
    pub fn spawn_sweeper(&self, max_idle: Duration, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(max_idle).await;
                if evicted > 0 {
                    info!("Evicted {evicted} idle answer session(s)");
                }
            }
        })
    }
}
