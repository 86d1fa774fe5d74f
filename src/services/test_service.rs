use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::test_dto::{CreateQuestionPayload, CreateTestPayload, UpdateQuestionPayload, UpdateTestPayload};
use crate::error::{Error, Result};
use crate::models::question::{Question, QuestionDetails};
use crate::models::test::Test;
use crate::store::memory::{TestRecord, TestStore};

#[derive(Clone)]
pub struct TestService {
    tests: Arc<TestStore>,
}

impl TestService {
    pub fn new(tests: Arc<TestStore>) -> Self {
        Self { tests }
    }

    pub fn create_test(&self, payload: CreateTestPayload, now: DateTime<Utc>) -> Result<Test> {
        if payload.start_time >= payload.end_time {
            return Err(Error::BadRequest(
                "start_time must be before end_time".to_string(),
            ));
        }
        if payload.published.unwrap_or(false) {
            return Err(Error::BadRequest(
                "A test cannot be created already published; add questions first, then publish"
                    .to_string(),
            ));
        }

        let test = Test {
            id: Uuid::new_v4(),
            title: payload.title,
            description: payload.description,
            start_time: payload.start_time,
            end_time: payload.end_time,
            total_marks: payload.total_marks,
            published: false,
            max_attempts: payload.max_attempts,
            created_by: payload.created_by,
            created_at: now,
            updated_at: now,
        };
        tracing::info!(test_id = %test.id, title = %test.title, "test created");
        self.tests.insert(TestRecord::new(test.clone()));
        Ok(test)
    }

    pub fn update_test(
        &self,
        test_id: Uuid,
        patch: UpdateTestPayload,
        now: DateTime<Utc>,
    ) -> Result<Test> {
        self.tests.update(test_id, |record| {
            if let Some(title) = patch.title {
                record.test.title = title;
            }
            if let Some(description) = patch.description {
                record.test.description = Some(description);
            }
            if let Some(start_time) = patch.start_time {
                record.test.start_time = start_time;
            }
            if let Some(end_time) = patch.end_time {
                record.test.end_time = end_time;
            }
            if let Some(total_marks) = patch.total_marks {
                record.test.total_marks = total_marks;
            }
            if let Some(max_attempts) = patch.max_attempts {
                record.test.max_attempts = max_attempts;
            }
            if record.test.start_time >= record.test.end_time {
                return Err(Error::BadRequest(
                    "start_time must be before end_time".to_string(),
                ));
            }
            if let Some(published) = patch.published {
                if published && !record.test.published {
                    ensure_publishable(record)?;
                }
                record.test.published = published;
            }
            record.test.updated_at = now;
            Ok(record.test.clone())
        })
    }

    pub fn delete_test(&self, test_id: Uuid) -> Result<()> {
        let record = self.tests.get(test_id)?;
        if record.test.published {
            return Err(Error::BadRequest(
                "Cannot delete a published test".to_string(),
            ));
        }
        self.tests.remove(test_id)?;
        tracing::info!(test_id = %test_id, "test deleted");
        Ok(())
    }

    pub fn get_test(&self, test_id: Uuid) -> Result<TestRecord> {
        self.tests.get(test_id)
    }

    pub fn list_tests(&self) -> Vec<Test> {
        self.tests.list()
    }

    pub fn add_question(
        &self,
        test_id: Uuid,
        payload: CreateQuestionPayload,
        now: DateTime<Utc>,
    ) -> Result<Question> {
        validate_details(&payload.details)?;
        self.tests.update(test_id, |record| {
            ensure_unpublished(record)?;
            let question_id = record.next_question_id;
            record.next_question_id += 1;
            let question = Question {
                id: question_id,
                test_id,
                question_text: payload.question_text,
                marks: payload.marks,
                negative_marks: payload.negative_marks,
                details: payload.details,
            };
            record.questions.insert(question_id, question.clone());
            record.test.updated_at = now;
            Ok(question)
        })
    }

    pub fn update_question(
        &self,
        test_id: Uuid,
        question_id: i32,
        patch: UpdateQuestionPayload,
        now: DateTime<Utc>,
    ) -> Result<Question> {
        if let Some(details) = &patch.details {
            validate_details(details)?;
        }
        self.tests.update(test_id, |record| {
            ensure_unpublished(record)?;
            let question = record.questions.get_mut(&question_id).ok_or_else(|| {
                Error::NotFound(format!("Question {} not found in test {}", question_id, test_id))
            })?;
            if let Some(question_text) = patch.question_text {
                question.question_text = question_text;
            }
            if let Some(marks) = patch.marks {
                question.marks = marks;
            }
            if let Some(negative_marks) = patch.negative_marks {
                question.negative_marks = negative_marks;
            }
            if let Some(details) = patch.details {
                question.details = details;
            }
            record.test.updated_at = now;
            Ok(record.questions[&question_id].clone())
        })
    }

    pub fn delete_question(
        &self,
        test_id: Uuid,
        question_id: i32,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.tests.update(test_id, |record| {
            ensure_unpublished(record)?;
            record.questions.remove(&question_id).ok_or_else(|| {
                Error::NotFound(format!("Question {} not found in test {}", question_id, test_id))
            })?;
            record.test.updated_at = now;
            Ok(())
        })
    }
}

/// Published tests have frozen question sets; in-flight attempts score
/// against their start-time snapshot either way.
fn ensure_unpublished(record: &TestRecord) -> Result<()> {
    if record.test.published {
        return Err(Error::BadRequest(
            "Cannot modify questions of a published test".to_string(),
        ));
    }
    Ok(())
}

fn ensure_publishable(record: &TestRecord) -> Result<()> {
    if record.questions.is_empty() {
        return Err(Error::BadRequest(
            "Cannot publish a test without questions".to_string(),
        ));
    }
    let live_total = record.question_marks_total();
    if live_total != record.test.total_marks {
        return Err(Error::BadRequest(format!(
            "total_marks ({}) does not match the sum of question marks ({})",
            record.test.total_marks, live_total
        )));
    }
    Ok(())
}

fn validate_details(details: &QuestionDetails) -> Result<()> {
    match details {
        QuestionDetails::Mcq(_) => Ok(()),
        QuestionDetails::Maq(maq) => {
            if maq.correct_options.is_empty() {
                return Err(Error::BadRequest(
                    "MAQ question requires at least one correct option".to_string(),
                ));
            }
            Ok(())
        }
        QuestionDetails::FillBlank(fill) => {
            if fill.correct_answer.trim().is_empty() {
                return Err(Error::BadRequest(
                    "FILL_BLANK question requires a non-blank correct answer".to_string(),
                ));
            }
            Ok(())
        }
    }
}
