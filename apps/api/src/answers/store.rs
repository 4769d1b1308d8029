//! Persistence for answered questions. Insert-only.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::answer::UserAnswerRow;

pub struct NewAnswer<'a> {
    pub mock_id_ref: Uuid,
    pub question: &'a str,
    pub correct_ans: &'a str,
    pub user_ans: &'a str,
    pub feedback: &'a str,
    pub rating: &'a str,
    pub user_email: &'a str,
}

pub async fn insert_answer(
    pool: &PgPool,
    answer: NewAnswer<'_>,
) -> Result<UserAnswerRow, sqlx::Error> {
    sqlx::query_as::<_, UserAnswerRow>(
        r#"
        INSERT INTO user_answers
            (mock_id_ref, question, correct_ans, user_ans, feedback, rating, user_email, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, CURRENT_DATE)
        RETURNING *
        "#,
    )
    .bind(answer.mock_id_ref)
    .bind(answer.question)
    .bind(answer.correct_ans)
    .bind(answer.user_ans)
    .bind(answer.feedback)
    .bind(answer.rating)
    .bind(answer.user_email)
    .fetch_one(pool)
    .await
}

/// All answers for an interview in insertion order.
pub async fn list_answers(pool: &PgPool, mock_id: Uuid) -> Result<Vec<UserAnswerRow>, sqlx::Error> {
    sqlx::query_as::<_, UserAnswerRow>(
        "SELECT * FROM user_answers WHERE mock_id_ref = $1 ORDER BY id",
    )
    .bind(mock_id)
    .fetch_all(pool)
    .await
}
