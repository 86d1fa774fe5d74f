//! In-memory persistence. The unit of isolation is one attempt: the
//! registry hands out `Arc<Mutex<AttemptAggregate>>` handles, and every
//! read-modify-write on an attempt's answers, counters or status happens
//! under that one mutex. The registry locks themselves are only held to
//! look up or insert entries, never across attempt-level work.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::attempt::AttemptAggregate;
use crate::models::question::Question;
use crate::models::test::Test;
use crate::models::user::VerifiedUser;

#[derive(Debug, Clone)]
pub struct TestRecord {
    pub test: Test,
    pub questions: BTreeMap<i32, Question>,
    pub next_question_id: i32,
}

impl TestRecord {
    pub fn new(test: Test) -> Self {
        Self {
            test,
            questions: BTreeMap::new(),
            next_question_id: 1,
        }
    }

    /// Live sum of question marks, checked against `total_marks` at publish.
    pub fn question_marks_total(&self) -> i32 {
        self.questions.values().map(|q| q.marks).sum()
    }
}

#[derive(Default)]
pub struct TestStore {
    inner: RwLock<HashMap<Uuid, TestRecord>>,
}

impl TestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: TestRecord) {
        let mut inner = self.inner.write().expect("test store lock poisoned");
        inner.insert(record.test.id, record);
    }

    pub fn get(&self, test_id: Uuid) -> Result<TestRecord> {
        let inner = self.inner.read().expect("test store lock poisoned");
        inner
            .get(&test_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Test {} not found", test_id)))
    }

    pub fn list(&self) -> Vec<Test> {
        let inner = self.inner.read().expect("test store lock poisoned");
        let mut tests: Vec<Test> = inner.values().map(|r| r.test.clone()).collect();
        tests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tests
    }

    /// Atomic read-modify-write of one test record.
    pub fn update<T>(
        &self,
        test_id: Uuid,
        apply: impl FnOnce(&mut TestRecord) -> Result<T>,
    ) -> Result<T> {
        let mut inner = self.inner.write().expect("test store lock poisoned");
        let record = inner
            .get_mut(&test_id)
            .ok_or_else(|| Error::NotFound(format!("Test {} not found", test_id)))?;
        apply(record)
    }

    pub fn remove(&self, test_id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().expect("test store lock poisoned");
        inner
            .remove(&test_id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("Test {} not found", test_id)))
    }
}

#[derive(Default)]
struct AttemptIndex {
    aggregates: HashMap<Uuid, Arc<Mutex<AttemptAggregate>>>,
    by_user: HashMap<Uuid, Vec<Uuid>>,
    by_test: HashMap<Uuid, Vec<Uuid>>,
    count_by_test_user: HashMap<(Uuid, Uuid), i32>,
}

#[derive(Default)]
pub struct AttemptStore {
    index: RwLock<AttemptIndex>,
    users: RwLock<HashMap<Uuid, VerifiedUser>>,
}

impl AttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the aggregate unless the user already has `max_attempts`
    /// attempts (of any status) on this test. Counting and inserting happen
    /// under one write lock so racing starts cannot both slip past the cap.
    pub fn insert_checked(&self, aggregate: AttemptAggregate, max_attempts: i32) -> Result<()> {
        let mut index = self.index.write().expect("attempt store lock poisoned");
        let attempt_id = aggregate.attempt.id;
        let key = (aggregate.attempt.test_id, aggregate.attempt.user_id);
        let prior = index.count_by_test_user.get(&key).copied().unwrap_or(0);
        if prior >= max_attempts {
            return Err(Error::AttemptLimitExceeded(max_attempts));
        }
        index.by_user.entry(key.1).or_default().push(attempt_id);
        index.by_test.entry(key.0).or_default().push(attempt_id);
        *index.count_by_test_user.entry(key).or_insert(0) += 1;
        index
            .aggregates
            .insert(attempt_id, Arc::new(Mutex::new(aggregate)));
        Ok(())
    }

    pub fn get(&self, attempt_id: Uuid) -> Result<Arc<Mutex<AttemptAggregate>>> {
        let index = self.index.read().expect("attempt store lock poisoned");
        index
            .aggregates
            .get(&attempt_id)
            .cloned()
            .ok_or(Error::AttemptNotFound(attempt_id))
    }

    pub fn for_user(&self, user_id: Uuid) -> Vec<Arc<Mutex<AttemptAggregate>>> {
        let index = self.index.read().expect("attempt store lock poisoned");
        index
            .by_user
            .get(&user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| index.aggregates.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn for_test(&self, test_id: Uuid) -> Vec<Arc<Mutex<AttemptAggregate>>> {
        let index = self.index.read().expect("attempt store lock poisoned");
        index
            .by_test
            .get(&test_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| index.aggregates.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn upsert_user(&self, user: VerifiedUser) {
        let mut users = self.users.write().expect("user registry lock poisoned");
        users.insert(user.id, user);
    }

    pub fn user(&self, user_id: Uuid) -> Option<VerifiedUser> {
        let users = self.users.read().expect("user registry lock poisoned");
        users.get(&user_id).cloned()
    }
}
