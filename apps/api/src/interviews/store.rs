//! Persistence for mock interviews and question sets. Insert-only; rows are never updated.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::interview::{MockInterviewRow, QuestionSetRow};

/// Column values for a new interview or question set row.
pub struct NewQuestionRecord<'a> {
    pub mock_id: Uuid,
    pub questions_json: &'a str,
    pub job_position: &'a str,
    pub job_desc: &'a str,
    pub job_experience: &'a str,
    pub created_by: &'a str,
}

pub async fn insert_interview(
    pool: &PgPool,
    record: NewQuestionRecord<'_>,
) -> Result<MockInterviewRow, sqlx::Error> {
    sqlx::query_as::<_, MockInterviewRow>(
        r#"
        INSERT INTO mock_interviews
            (mock_id, json_mock_resp, job_position, job_desc, job_experience, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, CURRENT_DATE)
        RETURNING *
        "#,
    )
    .bind(record.mock_id)
    .bind(record.questions_json)
    .bind(record.job_position)
    .bind(record.job_desc)
    .bind(record.job_experience)
    .bind(record.created_by)
    .fetch_one(pool)
    .await
}

/// Fetches an interview owned by `created_by`. Other users' interviews read as missing.
pub async fn find_interview(
    pool: &PgPool,
    mock_id: Uuid,
    created_by: &str,
) -> Result<Option<MockInterviewRow>, sqlx::Error> {
    sqlx::query_as::<_, MockInterviewRow>(
        "SELECT * FROM mock_interviews WHERE mock_id = $1 AND created_by = $2",
    )
    .bind(mock_id)
    .bind(created_by)
    .fetch_optional(pool)
    .await
}

pub async fn list_interviews(
    pool: &PgPool,
    created_by: &str,
) -> Result<Vec<MockInterviewRow>, sqlx::Error> {
    sqlx::query_as::<_, MockInterviewRow>(
        "SELECT * FROM mock_interviews WHERE created_by = $1 ORDER BY id DESC",
    )
    .bind(created_by)
    .fetch_all(pool)
    .await
}

pub async fn insert_question_set(
    pool: &PgPool,
    record: NewQuestionRecord<'_>,
    type_question: &str,
    company: &str,
) -> Result<QuestionSetRow, sqlx::Error> {
    sqlx::query_as::<_, QuestionSetRow>(
        r#"
        INSERT INTO question_sets
            (mock_id, question_json_resp, job_position, job_desc, job_experience,
             type_question, company, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, CURRENT_DATE)
        RETURNING *
        "#,
    )
    .bind(record.mock_id)
    .bind(record.questions_json)
    .bind(record.job_position)
    .bind(record.job_desc)
    .bind(record.job_experience)
    .bind(type_question)
    .bind(company)
    .bind(record.created_by)
    .fetch_one(pool)
    .await
}

pub async fn find_question_set(
    pool: &PgPool,
    mock_id: Uuid,
    created_by: &str,
) -> Result<Option<QuestionSetRow>, sqlx::Error> {
    sqlx::query_as::<_, QuestionSetRow>(
        "SELECT * FROM question_sets WHERE mock_id = $1 AND created_by = $2",
    )
    .bind(mock_id)
    .bind(created_by)
    .fetch_optional(pool)
    .await
}

pub async fn list_question_sets(
    pool: &PgPool,
    created_by: &str,
) -> Result<Vec<QuestionSetRow>, sqlx::Error> {
    sqlx::query_as::<_, QuestionSetRow>(
        "SELECT * FROM question_sets WHERE created_by = $1 ORDER BY id DESC",
    )
    .bind(created_by)
    .fetch_all(pool)
    .await
}
