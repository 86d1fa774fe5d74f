use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub question_id: i32,
    pub answer_text: String,
    /// Populated at submission only; None while the attempt is in progress.
    pub is_correct: Option<bool>,
    pub marks_obtained: Option<i32>,
    pub answered_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(
        attempt_id: Uuid,
        question_id: i32,
        answer_text: String,
        answered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            attempt_id,
            question_id,
            answer_text,
            is_correct: None,
            marks_obtained: None,
            answered_at,
        }
    }
}
