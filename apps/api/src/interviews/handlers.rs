//! Axum route handlers for interviews and question sets.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::UserEmail;
use crate::errors::AppError;
use crate::interviews::service::{
    create_interview, create_question_set, stored_questions, CreateInterviewRequest,
    CreateQuestionSetRequest,
};
use crate::interviews::store::{
    find_interview, find_question_set, list_interviews, list_question_sets,
};
use crate::models::interview::{MockInterviewRow, QuestionSetRow};
use crate::normalize::QuestionAnswer;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct InterviewResponse {
    pub interview: MockInterviewRow,
    pub questions: Vec<QuestionAnswer>,
}

#[derive(Debug, Serialize)]
pub struct QuestionSetResponse {
    pub question_set: QuestionSetRow,
    pub questions: Vec<QuestionAnswer>,
}

// ────────────────────────────────────────────────────────────────────────────
// Interviews
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Generates questions with the primary provider and stores the interview.
pub async fn handle_create_interview(
    State(state): State<AppState>,
    user: UserEmail,
    Json(request): Json<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewResponse>), AppError> {
    let (interview, questions) = create_interview(
        &state.db,
        state.gemini.as_ref(),
        state.config.question_count,
        user.as_str(),
        &request,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(InterviewResponse {
            interview,
            questions,
        }),
    ))
}

/// GET /api/v1/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    user: UserEmail,
) -> Result<Json<Vec<MockInterviewRow>>, AppError> {
    Ok(Json(list_interviews(&state.db, user.as_str()).await?))
}

/// GET /api/v1/interviews/:mock_id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    user: UserEmail,
    Path(mock_id): Path<Uuid>,
) -> Result<Json<InterviewResponse>, AppError> {
    let interview = load_interview(&state, &user, mock_id).await?;
    let questions = stored_questions(&interview.json_mock_resp)?;
    Ok(Json(InterviewResponse {
        interview,
        questions,
    }))
}

/// Loads an interview owned by `user` or fails with 404.
pub async fn load_interview(
    state: &AppState,
    user: &UserEmail,
    mock_id: Uuid,
) -> Result<MockInterviewRow, AppError> {
    find_interview(&state.db, mock_id, user.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {mock_id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Question sets
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/question-sets
pub async fn handle_create_question_set(
    State(state): State<AppState>,
    user: UserEmail,
    Json(request): Json<CreateQuestionSetRequest>,
) -> Result<(StatusCode, Json<QuestionSetResponse>), AppError> {
    let (question_set, questions) = create_question_set(
        &state.db,
        state.gemini.as_ref(),
        state.config.question_count,
        user.as_str(),
        &request,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(QuestionSetResponse {
            question_set,
            questions,
        }),
    ))
}

/// GET /api/v1/question-sets
pub async fn handle_list_question_sets(
    State(state): State<AppState>,
    user: UserEmail,
) -> Result<Json<Vec<QuestionSetRow>>, AppError> {
    Ok(Json(list_question_sets(&state.db, user.as_str()).await?))
}

/// GET /api/v1/question-sets/:mock_id
pub async fn handle_get_question_set(
    State(state): State<AppState>,
    user: UserEmail,
    Path(mock_id): Path<Uuid>,
) -> Result<Json<QuestionSetResponse>, AppError> {
    let question_set = find_question_set(&state.db, mock_id, user.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question set {mock_id} not found")))?;
    let questions = stored_questions(&question_set.question_json_resp)?;
    Ok(Json(QuestionSetResponse {
        question_set,
        questions,
    }))
}
