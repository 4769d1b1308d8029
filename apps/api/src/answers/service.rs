//! Answer submission and the read-side feedback dashboard.
//!
//! Flow: pick question → validate length → feedback prompt → Gemini then Cohere →
//!       reconcile → encode maps → INSERT.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::answers::session::MIN_ANSWER_CHARS;
use crate::answers::store::{insert_answer, NewAnswer};
use crate::errors::AppError;
use crate::feedback::prompts::{feedback_prompt, FeedbackContext};
use crate::feedback::rating::{overall_rating, OverallRating};
use crate::feedback::service::collect_dual_feedback;
use crate::feedback::{decode_feedback_column, decode_rating_column};
use crate::interviews::service::stored_questions;
use crate::llm_client::{Provider, TextProvider};
use crate::models::answer::UserAnswerRow;
use crate::models::interview::MockInterviewRow;
use crate::normalize::{QuestionAnswer, Rating};

/// Everything needed to ask for feedback on one answer.
#[derive(Debug)]
pub struct PreparedAnswer {
    pub question: QuestionAnswer,
    pub user_answer: String,
    pub prompt: String,
}

/// Resolves the question and builds the feedback prompt. No I/O.
pub fn prepare_answer(
    interview: &MockInterviewRow,
    question_index: usize,
    user_answer: &str,
) -> Result<PreparedAnswer, AppError> {
    let user_answer = user_answer.trim();
    if user_answer.chars().count() <= MIN_ANSWER_CHARS {
        return Err(AppError::Validation(format!(
            "Answer must be longer than {MIN_ANSWER_CHARS} characters"
        )));
    }

    let question = stored_questions(&interview.json_mock_resp)?
        .into_iter()
        .nth(question_index)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Question {question_index} not found in interview {}",
                interview.mock_id
            ))
        })?;

    let context = FeedbackContext {
        job_position: &interview.job_position,
        job_desc: &interview.job_desc,
        job_experience: &interview.job_experience,
    };
    let prompt = feedback_prompt(context, &question.question, user_answer);

    Ok(PreparedAnswer {
        question,
        user_answer: user_answer.to_string(),
        prompt,
    })
}

/// Collects dual feedback for one answer and stores it.
///
/// Provider failures never fail the submission; only validation and the insert can.
pub async fn submit_answer(
    pool: &PgPool,
    gemini: &dyn TextProvider,
    cohere: &dyn TextProvider,
    interview: &MockInterviewRow,
    question_index: usize,
    user_answer: &str,
    user_email: &str,
) -> Result<UserAnswerRow, AppError> {
    let prepared = prepare_answer(interview, question_index, user_answer)?;

    info!(
        "Collecting feedback for interview {} question {}",
        interview.mock_id, question_index
    );
    let reconciled = collect_dual_feedback(gemini, cohere, &prepared.prompt).await;
    let (feedback, rating) = reconciled
        .encode()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode feedback: {e}")))?;

    let row = insert_answer(
        pool,
        NewAnswer {
            mock_id_ref: interview.mock_id,
            question: &prepared.question.question,
            correct_ans: &prepared.question.answer,
            user_ans: &prepared.user_answer,
            feedback: &feedback,
            rating: &rating,
            user_email,
        },
    )
    .await?;

    info!("Answer {} stored (rating {rating})", row.id);
    Ok(row)
}

// ────────────────────────────────────────────────────────────────────────────
// Read side
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderVerdict {
    pub rating: Rating,
    pub feedback: String,
}

/// One stored answer with its feedback maps decoded for display.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerFeedbackView {
    pub id: i32,
    pub question: String,
    pub correct_ans: Option<String>,
    pub user_ans: Option<String>,
    pub created_at: NaiveDate,
    pub gemini: ProviderVerdict,
    pub cohere: ProviderVerdict,
}

impl AnswerFeedbackView {
    pub fn from_row(row: &UserAnswerRow) -> Self {
        let feedback = decode_feedback_column(row.feedback.as_deref());
        let rating = decode_rating_column(row.rating.as_deref());
        let verdict = |provider: Provider| ProviderVerdict {
            rating: rating.rating_for(provider),
            feedback: feedback.text_for(provider),
        };

        Self {
            id: row.id,
            question: row.question.clone(),
            correct_ans: row.correct_ans.clone(),
            user_ans: row.user_ans.clone(),
            created_at: row.created_at,
            gemini: verdict(Provider::Gemini),
            cohere: verdict(Provider::Cohere),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackDashboard {
    pub mock_id: Uuid,
    pub overall: OverallRating,
    pub answers: Vec<AnswerFeedbackView>,
}

/// Builds the dashboard from rows already ordered by id.
pub fn feedback_dashboard(mock_id: Uuid, rows: &[UserAnswerRow]) -> FeedbackDashboard {
    let ratings: Vec<_> = rows
        .iter()
        .map(|row| decode_rating_column(row.rating.as_deref()))
        .collect();

    FeedbackDashboard {
        mock_id,
        overall: overall_rating(&ratings),
        answers: rows.iter().map(AnswerFeedbackView::from_row).collect(),
    }
}
