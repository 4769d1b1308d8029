//! Question generation pipeline.
//!
//! Flow: validate input → build prompt → Gemini → normalize `[{Question, Answer}]` →
//!       INSERT → return row + parsed questions.
//!
//! Unlike answer feedback there is no sentinel here: a response without usable questions
//! has nothing worth storing, so it surfaces as an error.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interviews::prompts::{interview_prompt, question_set_prompt, RoleDetails};
use crate::interviews::store::{insert_interview, insert_question_set, NewQuestionRecord};
use crate::llm_client::TextProvider;
use crate::models::interview::{MockInterviewRow, QuestionSetRow};
use crate::normalize::{encode_question_set, normalize_question_set, QuestionAnswer};

pub const MAX_YEARS_OF_EXPERIENCE: u32 = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInterviewRequest {
    pub job_position: String,
    pub job_desc: String,
    pub job_experience: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestionSetRequest {
    pub job_position: String,
    pub job_desc: String,
    pub job_experience: u32,
    pub type_question: String,
    pub company: String,
}

/// Rejects blank text fields and out-of-range experience.
pub fn validate_role(job_position: &str, job_desc: &str, job_experience: u32) -> Result<(), AppError> {
    if job_position.trim().is_empty() {
        return Err(AppError::Validation("job_position cannot be empty".to_string()));
    }
    if job_desc.trim().is_empty() {
        return Err(AppError::Validation("job_desc cannot be empty".to_string()));
    }
    if job_experience > MAX_YEARS_OF_EXPERIENCE {
        return Err(AppError::Validation(format!(
            "job_experience must be between 0 and {MAX_YEARS_OF_EXPERIENCE}"
        )));
    }
    Ok(())
}

/// Generates a mock interview for `created_by` and persists it.
pub async fn create_interview(
    pool: &PgPool,
    llm: &dyn TextProvider,
    question_count: u32,
    created_by: &str,
    request: &CreateInterviewRequest,
) -> Result<(MockInterviewRow, Vec<QuestionAnswer>), AppError> {
    validate_role(&request.job_position, &request.job_desc, request.job_experience)?;

    let experience = request.job_experience.to_string();
    let role = RoleDetails {
        job_position: request.job_position.trim(),
        job_desc: request.job_desc.trim(),
        job_experience: &experience,
    };

    info!(
        "Generating {} interview questions for '{}' ({})",
        question_count, role.job_position, created_by
    );
    let questions = generate_questions(llm, &interview_prompt(role, question_count), question_count).await?;
    let questions_json = encode_questions(&questions)?;

    let row = insert_interview(
        pool,
        NewQuestionRecord {
            mock_id: Uuid::new_v4(),
            questions_json: &questions_json,
            job_position: role.job_position,
            job_desc: role.job_desc,
            job_experience: role.job_experience,
            created_by,
        },
    )
    .await?;

    info!("Mock interview {} created", row.mock_id);
    Ok((row, questions))
}

/// Generates a company/type-tagged question set for `created_by` and persists it.
pub async fn create_question_set(
    pool: &PgPool,
    llm: &dyn TextProvider,
    question_count: u32,
    created_by: &str,
    request: &CreateQuestionSetRequest,
) -> Result<(QuestionSetRow, Vec<QuestionAnswer>), AppError> {
    validate_role(&request.job_position, &request.job_desc, request.job_experience)?;
    if request.type_question.trim().is_empty() {
        return Err(AppError::Validation("type_question cannot be empty".to_string()));
    }
    if request.company.trim().is_empty() {
        return Err(AppError::Validation("company cannot be empty".to_string()));
    }

    let experience = request.job_experience.to_string();
    let role = RoleDetails {
        job_position: request.job_position.trim(),
        job_desc: request.job_desc.trim(),
        job_experience: &experience,
    };
    let prompt = question_set_prompt(
        role,
        request.type_question.trim(),
        request.company.trim(),
        question_count,
    );

    info!(
        "Generating {} '{}' questions for '{}' at {}",
        question_count,
        request.type_question.trim(),
        role.job_position,
        request.company.trim()
    );
    let questions = generate_questions(llm, &prompt, question_count).await?;
    let questions_json = encode_questions(&questions)?;

    let row = insert_question_set(
        pool,
        NewQuestionRecord {
            mock_id: Uuid::new_v4(),
            questions_json: &questions_json,
            job_position: role.job_position,
            job_desc: role.job_desc,
            job_experience: role.job_experience,
            created_by,
        },
        request.type_question.trim(),
        request.company.trim(),
    )
    .await?;

    info!("Question set {} created", row.mock_id);
    Ok((row, questions))
}

/// Calls the provider once and validates the response as a question list.
pub async fn generate_questions(
    llm: &dyn TextProvider,
    prompt: &str,
    expected: u32,
) -> Result<Vec<QuestionAnswer>, AppError> {
    let raw = llm.complete(prompt).await?;
    let questions = normalize_question_set(&raw)?;

    if questions.len() != expected as usize {
        warn!(
            "Asked {} for {} questions, got {}",
            llm.provider(),
            expected,
            questions.len()
        );
    }

    Ok(questions)
}

/// Parses a stored question blob back into pairs.
pub fn stored_questions(json: &str) -> Result<Vec<QuestionAnswer>, AppError> {
    normalize_question_set(json).map_err(|e| {
        AppError::Internal(anyhow::anyhow!("Stored question list is unreadable: {e}"))
    })
}

fn encode_questions(questions: &[QuestionAnswer]) -> Result<String, AppError> {
    encode_question_set(questions)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize questions: {e}")))
}
