use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::{Question, QuestionDetails};
use crate::models::test::Test;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTestPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[validate(range(min = 0))]
    pub total_marks: i32,
    #[validate(range(min = 1))]
    pub max_attempts: i32,
    pub published: Option<bool>,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateTestPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[validate(range(min = 0))]
    pub total_marks: Option<i32>,
    #[validate(range(min = 1))]
    pub max_attempts: Option<i32>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestionPayload {
    #[validate(length(min = 1, max = 2000))]
    pub question_text: String,
    #[validate(range(min = 1))]
    pub marks: i32,
    #[validate(range(min = 0))]
    pub negative_marks: i32,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateQuestionPayload {
    #[validate(length(min = 1, max = 2000))]
    pub question_text: Option<String>,
    #[validate(range(min = 1))]
    pub marks: Option<i32>,
    #[validate(range(min = 0))]
    pub negative_marks: Option<i32>,
    #[serde(flatten)]
    pub details: Option<QuestionDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestWithQuestions {
    pub test: Test,
    pub questions: Vec<Question>,
}
