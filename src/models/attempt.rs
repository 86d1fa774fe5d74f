use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::answer::Answer;
use crate::models::question::Question;
use crate::models::session_report::SessionReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptStatus {
    #[serde(rename = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "SUBMITTED")]
    Submitted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub id: Uuid,
    pub test_id: Uuid,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub status: AttemptStatus,
    /// Frozen at start from the question snapshot's marks.
    pub max_score: i32,
    /// Set only at submission.
    pub score: Option<i32>,
}

impl Attempt {
    pub fn is_submitted(&self) -> bool {
        self.status == AttemptStatus::Submitted
    }
}

/// Everything one attempt owns: its record, the question snapshot taken at
/// start, the answers recorded so far and the proctoring report. Guarded as
/// a unit by one mutex so submission sees a consistent picture of all of it.
#[derive(Debug)]
pub struct AttemptAggregate {
    pub attempt: Attempt,
    pub questions: Vec<Question>,
    pub answers: BTreeMap<i32, Answer>,
    pub report: SessionReport,
}

impl AttemptAggregate {
    pub fn start(test_id: Uuid, user_id: Uuid, questions: Vec<Question>, now: DateTime<Utc>) -> Self {
        let attempt_id = Uuid::new_v4();
        let max_score = questions.iter().map(|q| q.marks).sum();
        Self {
            attempt: Attempt {
                id: attempt_id,
                test_id,
                user_id,
                started_at: now,
                submitted_at: None,
                status: AttemptStatus::InProgress,
                max_score,
                score: None,
            },
            questions,
            answers: BTreeMap::new(),
            report: SessionReport::new(attempt_id),
        }
    }

    pub fn question(&self, question_id: i32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}
