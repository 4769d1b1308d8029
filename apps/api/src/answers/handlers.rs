use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::answers::pipeline::{process_recording, submit_typed_answer, RecordingResponse};
use crate::answers::service::{feedback_dashboard, AnswerFeedbackView, FeedbackDashboard};
use crate::answers::session::SessionKey;
use crate::answers::store::list_answers;
use crate::auth::UserEmail;
use crate::errors::AppError;
use crate::interviews::handlers::load_interview;
use crate::interviews::service::stored_questions;
use crate::models::interview::MockInterviewRow;
use crate::state::AppState;

/// Multipart field carrying the recorded answer.
pub const AUDIO_FIELD: &str = "audio";
pub const DEFAULT_AUDIO_MIME: &str = "audio/webm";

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub question_index: usize,
    pub user_answer: String,
}

fn session_key(user: &UserEmail, mock_id: Uuid, question_index: usize) -> SessionKey {
    SessionKey {
        user_email: user.as_str().to_string(),
        mock_id,
        question_index,
    }
}

/// Loads the caller's interview and checks the question index exists.
async fn load_question_target(
    state: &AppState,
    user: &UserEmail,
    mock_id: Uuid,
    question_index: usize,
) -> Result<MockInterviewRow, AppError> {
    let interview = load_interview(state, user, mock_id).await?;
    let count = stored_questions(&interview.json_mock_resp)?.len();
    if question_index >= count {
        return Err(AppError::NotFound(format!(
            "Question {question_index} not found in interview {mock_id}"
        )));
    }
    Ok(interview)
}

/// POST /api/v1/interviews/:mock_id/answers
///
/// Typed answer. Replaces the question's answer buffer and submits it.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    user: UserEmail,
    Path(mock_id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<(StatusCode, Json<AnswerFeedbackView>), AppError> {
    let interview = load_question_target(&state, &user, mock_id, req.question_index).await?;
    let key = session_key(&user, mock_id, req.question_index);

    let row = submit_typed_answer(&state, key, interview, &req.user_answer).await?;
    Ok((StatusCode::CREATED, Json(AnswerFeedbackView::from_row(&row))))
}

/// POST /api/v1/interviews/:mock_id/questions/:index/recording/start
pub async fn handle_start_recording(
    State(state): State<AppState>,
    user: UserEmail,
    Path((mock_id, index)): Path<(Uuid, usize)>,
) -> Result<Json<RecordingResponse>, AppError> {
    load_question_target(&state, &user, mock_id, index).await?;
    let key = session_key(&user, mock_id, index);

    let session = state
        .sessions
        .with_session(&key, |session| {
            session.start_recording().map(|_| session.clone())
        })
        .await?;

    info!("Recording started for {mock_id} question {index}");
    Ok(Json(RecordingResponse::from_session(&session)))
}

/// POST /api/v1/interviews/:mock_id/questions/:index/recording/stop
///
/// Accepts the recorded audio, transcribes it into the answer buffer and submits the
/// buffer once it is long enough. Upload size is capped by the route's body limit.
pub async fn handle_stop_recording(
    State(state): State<AppState>,
    user: UserEmail,
    Path((mock_id, index)): Path<(Uuid, usize)>,
    multipart: Multipart,
) -> Result<Json<RecordingResponse>, AppError> {
    let (audio, mime_type) = read_audio_field(multipart).await?;
    let interview = load_question_target(&state, &user, mock_id, index).await?;

    info!(
        "Recording stopped for {mock_id} question {index} ({} bytes, {mime_type})",
        audio.len()
    );
    let response = process_recording(
        &state,
        session_key(&user, mock_id, index),
        interview,
        audio,
        mime_type,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/v1/interviews/:mock_id/questions/:index/recording
pub async fn handle_recording_status(
    State(state): State<AppState>,
    user: UserEmail,
    Path((mock_id, index)): Path<(Uuid, usize)>,
) -> Result<Json<RecordingResponse>, AppError> {
    load_question_target(&state, &user, mock_id, index).await?;
    let session = state
        .sessions
        .snapshot(&session_key(&user, mock_id, index))
        .await;

    Ok(Json(RecordingResponse::from_session(&session)))
}

/// GET /api/v1/interviews/:mock_id/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    user: UserEmail,
    Path(mock_id): Path<Uuid>,
) -> Result<Json<FeedbackDashboard>, AppError> {
    load_interview(&state, &user, mock_id).await?;
    let rows = list_answers(&state.db, mock_id).await?;
    Ok(Json(feedback_dashboard(mock_id, &rows)))
}

/// Pulls the `audio` field out of the upload. The MIME type defaults to `audio/webm`.
async fn read_audio_field(mut multipart: Multipart) -> Result<(Bytes, String), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let mime_type = field
            .content_type()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_AUDIO_MIME)
            .to_string();
        let audio = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read audio: {e}")))?;

        if audio.is_empty() {
            return Err(AppError::Validation("Audio recording is empty".to_string()));
        }
        return Ok((audio, mime_type));
    }

    Err(AppError::Validation(format!(
        "Missing '{AUDIO_FIELD}' field in upload"
    )))
}
