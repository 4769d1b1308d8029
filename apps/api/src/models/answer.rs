use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One answered question. `feedback` and `rating` are JSON `{gemini, cohere}` maps
/// stored as text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAnswerRow {
    pub id: i32,
    pub mock_id_ref: Uuid,
    pub question: String,
    pub correct_ans: Option<String>,
    pub user_ans: Option<String>,
    pub feedback: Option<String>,
    pub rating: Option<String>,
    pub user_email: Option<String>,
    pub created_at: NaiveDate,
}
