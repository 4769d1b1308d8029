use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A generated mock interview. `json_mock_resp` holds the validated
/// `[{Question, Answer}]` list as text; the row is never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MockInterviewRow {
    pub id: i32,
    pub mock_id: Uuid,
    pub json_mock_resp: String,
    pub job_position: String,
    pub job_desc: String,
    pub job_experience: String,
    pub created_by: String,
    pub created_at: NaiveDate,
}

/// A PYQ-style question set: interview fields plus company and question-type tags.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionSetRow {
    pub id: i32,
    pub mock_id: Uuid,
    pub question_json_resp: String,
    pub job_position: String,
    pub job_desc: String,
    pub job_experience: String,
    pub type_question: String,
    pub company: String,
    pub created_by: String,
    pub created_at: NaiveDate,
}
