use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::answer::Answer;
use crate::models::attempt::{Attempt, AttemptAggregate};
use crate::models::question::Question;
use crate::models::session_report::SessionReport;
use crate::models::user::VerifiedUser;
use crate::services::grading_service::GradingService;
use crate::services::session_service::SessionService;
use crate::store::memory::{AttemptStore, TestStore};

#[derive(Clone)]
pub struct AttemptService {
    tests: Arc<TestStore>,
    attempts: Arc<AttemptStore>,
    sessions: SessionService,
}

#[derive(Debug, Clone)]
pub struct StartedAttempt {
    pub attempt: Attempt,
    pub report: SessionReport,
    pub questions: Vec<Question>,
}

/// Read-only reporting projection over a submitted attempt; assembled on
/// demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub attempt_id: Uuid,
    pub test_id: Uuid,
    pub test_title: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub score: i32,
    pub max_score: i32,
    pub percentage: f64,
    pub submitted_at: DateTime<Utc>,
    pub is_valid_test: bool,
}

impl AttemptService {
    pub fn new(tests: Arc<TestStore>, attempts: Arc<AttemptStore>, sessions: SessionService) -> Self {
        Self {
            tests,
            attempts,
            sessions,
        }
    }

    /// Gatekeeper for new attempts: the test must exist, be inside its
    /// window, be published, and the user must be under the attempt cap.
    /// The question set and max score are snapshotted here; later edits to
    /// the test never reach this attempt.
    pub fn start_attempt(
        &self,
        user: VerifiedUser,
        test_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<StartedAttempt> {
        let record = self.tests.get(test_id)?;
        if !record.test.window_contains(now) {
            return Err(Error::OutsideWindow);
        }
        if !record.test.published {
            return Err(Error::NotPublished);
        }

        let questions: Vec<Question> = record.questions.values().cloned().collect();
        let aggregate = AttemptAggregate::start(test_id, user.id, questions, now);
        let started = StartedAttempt {
            attempt: aggregate.attempt.clone(),
            report: aggregate.report.clone(),
            questions: aggregate.questions.clone(),
        };
        self.attempts
            .insert_checked(aggregate, record.test.max_attempts)?;
        self.attempts.upsert_user(user);

        tracing::info!(
            attempt_id = %started.attempt.id,
            test_id = %test_id,
            user_id = %started.attempt.user_id,
            max_score = started.attempt.max_score,
            "attempt started"
        );
        Ok(started)
    }

    /// Upserts the answer for (attempt, question): repeated calls overwrite
    /// the text, nothing is graded until submission.
    pub fn record_answer(
        &self,
        attempt_id: Uuid,
        question_id: i32,
        answer_text: String,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        let aggregate = self.attempts.get(attempt_id)?;
        let mut guard = aggregate.lock().expect("attempt aggregate mutex poisoned");
        if guard.attempt.is_submitted() {
            return Err(Error::AttemptAlreadySubmitted(attempt_id));
        }
        if guard.question(question_id).is_none() {
            return Err(Error::QuestionNotInTest(question_id));
        }
        match guard.answers.entry(question_id) {
            Entry::Occupied(mut entry) => {
                let answer = entry.get_mut();
                answer.answer_text = answer_text;
                answer.answered_at = now;
            }
            Entry::Vacant(entry) => {
                entry.insert(Answer::new(attempt_id, question_id, answer_text, now));
            }
        }
        Ok(now)
    }

    /// One-way transition to SUBMITTED. Every snapshot question is graded
    /// (skips become zero-mark placeholder answers), the total is clamped at
    /// zero, and the session verdict is finalized — all under the aggregate
    /// lock, so a racing write either lands before scoring or is rejected.
    pub fn submit_attempt(
        &self,
        attempt_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(Attempt, SessionReport)> {
        let aggregate = self.attempts.get(attempt_id)?;
        let mut guard = aggregate.lock().expect("attempt aggregate mutex poisoned");
        if guard.attempt.is_submitted() {
            return Err(Error::AttemptAlreadySubmitted(attempt_id));
        }

        let inner = &mut *guard;
        let mut total: i32 = 0;
        for question in &inner.questions {
            let outcome = match inner.answers.get_mut(&question.id) {
                Some(answer) => {
                    let outcome = GradingService::grade(question, Some(&answer.answer_text));
                    answer.is_correct = Some(outcome.is_correct);
                    answer.marks_obtained = Some(outcome.marks_obtained);
                    outcome
                }
                None => {
                    let outcome = GradingService::grade(question, None);
                    let mut placeholder =
                        Answer::new(attempt_id, question.id, String::new(), now);
                    placeholder.is_correct = Some(outcome.is_correct);
                    placeholder.marks_obtained = Some(outcome.marks_obtained);
                    inner.answers.insert(question.id, placeholder);
                    outcome
                }
            };
            total += outcome.marks_obtained;
        }

        // Negative marking may drive individual answers below zero, never
        // the attempt total.
        inner.attempt.score = Some(total.max(0));
        inner.attempt.submitted_at = Some(now);
        inner.attempt.status = crate::models::attempt::AttemptStatus::Submitted;
        self.sessions.finalize_validity(inner);

        tracing::info!(
            attempt_id = %attempt_id,
            score = inner.attempt.score.unwrap_or(0),
            max_score = inner.attempt.max_score,
            is_valid = inner.report.is_valid_test.unwrap_or(false),
            "attempt submitted"
        );
        Ok((inner.attempt.clone(), inner.report.clone()))
    }

    pub fn attempts_for_user(&self, user_id: Uuid) -> Vec<Attempt> {
        self.attempts
            .for_user(user_id)
            .iter()
            .map(|aggregate| {
                aggregate
                    .lock()
                    .expect("attempt aggregate mutex poisoned")
                    .attempt
                    .clone()
            })
            .collect()
    }

    pub fn attempts_for_test(&self, test_id: Uuid) -> Vec<Attempt> {
        self.attempts
            .for_test(test_id)
            .iter()
            .map(|aggregate| {
                aggregate
                    .lock()
                    .expect("attempt aggregate mutex poisoned")
                    .attempt
                    .clone()
            })
            .collect()
    }

    /// Full attempt view for review: the record, its answers and the report.
    pub fn get_attempt(&self, attempt_id: Uuid) -> Result<(Attempt, Vec<Answer>, SessionReport)> {
        let aggregate = self.attempts.get(attempt_id)?;
        let guard = aggregate.lock().expect("attempt aggregate mutex poisoned");
        Ok((
            guard.attempt.clone(),
            guard.answers.values().cloned().collect(),
            guard.report.clone(),
        ))
    }

    pub fn get_result(&self, attempt_id: Uuid) -> Result<TestResult> {
        let aggregate = self.attempts.get(attempt_id)?;
        let guard = aggregate.lock().expect("attempt aggregate mutex poisoned");
        if !guard.attempt.is_submitted() {
            return Err(Error::BadRequest(
                "Attempt has not been submitted yet".to_string(),
            ));
        }
        let attempt = guard.attempt.clone();
        let report = guard.report.clone();
        drop(guard);

        let record = self.tests.get(attempt.test_id)?;
        self.build_result(&attempt, &report, &record.test.title)
    }

    /// Result projections for every submitted attempt on a test.
    pub fn results_for_test(&self, test_id: Uuid) -> Result<Vec<TestResult>> {
        let record = self.tests.get(test_id)?;
        let mut results = Vec::new();
        for aggregate in self.attempts.for_test(test_id) {
            let guard = aggregate.lock().expect("attempt aggregate mutex poisoned");
            if !guard.attempt.is_submitted() {
                continue;
            }
            let attempt = guard.attempt.clone();
            let report = guard.report.clone();
            drop(guard);
            results.push(self.build_result(&attempt, &report, &record.test.title)?);
        }
        Ok(results)
    }

    fn build_result(
        &self,
        attempt: &Attempt,
        report: &SessionReport,
        test_title: &str,
    ) -> Result<TestResult> {
        let user = self
            .attempts
            .user(attempt.user_id)
            .ok_or_else(|| Error::Internal(format!("No identity recorded for user {}", attempt.user_id)))?;
        let score = attempt.score.unwrap_or(0);
        let percentage = if attempt.max_score > 0 {
            (score as f64 / attempt.max_score as f64) * 100.0
        } else {
            0.0
        };
        Ok(TestResult {
            attempt_id: attempt.id,
            test_id: attempt.test_id,
            test_title: test_title.to_string(),
            user_id: user.id,
            user_name: user.name,
            user_email: user.email,
            score,
            max_score: attempt.max_score,
            percentage,
            submitted_at: attempt
                .submitted_at
                .ok_or_else(|| Error::Internal("Submitted attempt missing submitted_at".to_string()))?,
            is_valid_test: report.is_valid_test.unwrap_or(false),
        })
    }
}
