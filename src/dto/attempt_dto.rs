use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::answer::Answer;
use crate::models::attempt::{Attempt, AttemptStatus};
use crate::models::question::{Question, QuestionType};
use crate::models::session_report::{SessionReport, SignalKind};
use crate::models::user::VerifiedUser;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StartAttemptRequest {
    pub test_id: Uuid,
    #[validate(nested)]
    pub user: VerifiedUserPayload,
}

/// Identity already verified upstream; the engine only records it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifiedUserPayload {
    pub id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

impl From<VerifiedUserPayload> for VerifiedUser {
    fn from(payload: VerifiedUserPayload) -> Self {
        VerifiedUser {
            id: payload.id,
            name: payload.name,
            email: payload.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartAttemptResponse {
    pub attempt: Attempt,
    pub session_report_id: Uuid,
    pub questions: Vec<PublicQuestionView>,
}

/// Question as the student sees it: no correct option, set or answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestionView {
    pub id: i32,
    pub question_type: QuestionType,
    pub question_text: String,
    pub marks: i32,
    pub negative_marks: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<QuestionOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOptions {
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
}

impl PublicQuestionView {
    pub fn from_question(question: &Question) -> Self {
        let options = question.details.options().map(|[a, b, c, d]| QuestionOptions {
            option_a: a.to_string(),
            option_b: b.to_string(),
            option_c: c.to_string(),
            option_d: d.to_string(),
        });
        Self {
            id: question.id,
            question_type: question.kind(),
            question_text: question.question_text.clone(),
            marks: question.marks,
            negative_marks: question.negative_marks,
            options,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordAnswerRequest {
    pub question_id: i32,
    #[validate(length(min = 1, max = 4096))]
    pub answer_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordAnswerResponse {
    pub saved: bool,
    pub question_id: i32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRequest {
    pub kind: SignalKind,
    #[serde(default = "default_signal_delta")]
    pub delta: u32,
}

fn default_signal_delta() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalResponse {
    pub recorded: bool,
    pub kind: SignalKind,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAttemptResponse {
    pub attempt_id: Uuid,
    pub status: AttemptStatus,
    pub score: i32,
    pub max_score: i32,
    pub percentage: f64,
    pub is_valid_test: bool,
    pub invalid_reason: Option<String>,
    pub message: String,
}

/// Review view: the attempt plus everything it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptDetailResponse {
    pub attempt: Attempt,
    pub answers: Vec<Answer>,
    pub session_report: SessionReport,
}
