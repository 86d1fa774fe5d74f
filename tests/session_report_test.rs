use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use exam_backend::dto::test_dto::{CreateQuestionPayload, CreateTestPayload, UpdateTestPayload};
use exam_backend::error::Error;
use exam_backend::models::question::{AnswerLetter, McqDetails, QuestionDetails};
use exam_backend::models::session_report::SignalKind;
use exam_backend::models::user::VerifiedUser;
use exam_backend::services::attempt_service::AttemptService;
use exam_backend::services::session_service::{SessionService, ValidityPolicy};
use exam_backend::services::test_service::TestService;
use exam_backend::store::memory::{AttemptStore, TestStore};

fn policy() -> ValidityPolicy {
    ValidityPolicy {
        max_look_aways: 3,
        max_face_visibility_issues: 2,
        max_head_tilts: 5,
        max_heads_turned: 5,
        max_audio_incidents: 2,
    }
}

/// One published single-question test with a started attempt.
fn setup() -> (AttemptService, SessionService, Uuid) {
    let tests = Arc::new(TestStore::new());
    let attempts = Arc::new(AttemptStore::new());
    let sessions = SessionService::new(attempts.clone(), policy());
    let test_service = TestService::new(tests.clone());
    let attempt_service = AttemptService::new(tests, attempts, sessions.clone());

    let now = Utc::now();
    let test = test_service
        .create_test(
            CreateTestPayload {
                title: "Monitored".into(),
                description: None,
                start_time: now - Duration::hours(1),
                end_time: now + Duration::hours(1),
                total_marks: 2,
                max_attempts: 1,
                published: None,
                created_by: Uuid::new_v4(),
            },
            now,
        )
        .expect("create test");
    test_service
        .add_question(
            test.id,
            CreateQuestionPayload {
                question_text: "Pick one".into(),
                marks: 2,
                negative_marks: 0,
                details: QuestionDetails::Mcq(McqDetails {
                    option_a: "one".into(),
                    option_b: "two".into(),
                    option_c: "three".into(),
                    option_d: "four".into(),
                    correct_option: AnswerLetter::A,
                }),
            },
            now,
        )
        .expect("add question");
    test_service
        .update_test(
            test.id,
            UpdateTestPayload {
                title: None,
                description: None,
                start_time: None,
                end_time: None,
                total_marks: None,
                max_attempts: None,
                published: Some(true),
            },
            now,
        )
        .expect("publish");

    let started = attempt_service
        .start_attempt(
            VerifiedUser {
                id: Uuid::new_v4(),
                name: "Bob".into(),
                email: "bob@example.com".into(),
            },
            test.id,
            now,
        )
        .expect("start attempt");
    (attempt_service, sessions, started.attempt.id)
}

#[test]
fn counters_accumulate_per_kind() {
    let (_attempts, sessions, attempt_id) = setup();
    sessions
        .increment_signal(attempt_id, SignalKind::LookAways, 2)
        .unwrap();
    let total = sessions
        .increment_signal(attempt_id, SignalKind::LookAways, 1)
        .unwrap();
    assert_eq!(total, 3);
    sessions
        .increment_signal(attempt_id, SignalKind::AudioIncidents, 1)
        .unwrap();

    let report = sessions.report(attempt_id).unwrap();
    assert_eq!(report.look_aways, 3);
    assert_eq!(report.audio_incidents, 1);
    assert_eq!(report.multiple_people, 0);
    assert_eq!(report.is_valid_test, None);
}

#[test]
fn zero_delta_is_accepted_and_changes_nothing() {
    let (_attempts, sessions, attempt_id) = setup();
    let total = sessions
        .increment_signal(attempt_id, SignalKind::HeadTilts, 0)
        .unwrap();
    assert_eq!(total, 0);
}

#[test]
fn unknown_attempt_is_rejected() {
    let (_attempts, sessions, _attempt_id) = setup();
    let err = sessions
        .increment_signal(Uuid::new_v4(), SignalKind::LookAways, 1)
        .unwrap_err();
    assert!(matches!(err, Error::AttemptNotFound(_)));
}

#[test]
fn clean_session_is_valid() {
    let (attempts, sessions, attempt_id) = setup();
    attempts.submit_attempt(attempt_id, Utc::now()).unwrap();
    let report = sessions.report(attempt_id).unwrap();
    assert_eq!(report.is_valid_test, Some(true));
    assert_eq!(report.invalid_reason, None);
}

#[test]
fn multiple_people_outranks_mobile_detected() {
    let (attempts, sessions, attempt_id) = setup();
    sessions
        .increment_signal(attempt_id, SignalKind::MobileDetected, 2)
        .unwrap();
    sessions
        .increment_signal(attempt_id, SignalKind::MultiplePeople, 1)
        .unwrap();
    attempts.submit_attempt(attempt_id, Utc::now()).unwrap();

    let report = sessions.report(attempt_id).unwrap();
    assert_eq!(report.is_valid_test, Some(false));
    let reason = report.invalid_reason.expect("reason");
    assert!(reason.contains("Multiple people"), "got {:?}", reason);
}

#[test]
fn face_visibility_outranks_look_aways() {
    let (attempts, sessions, attempt_id) = setup();
    sessions
        .increment_signal(attempt_id, SignalKind::LookAways, 10)
        .unwrap();
    sessions
        .increment_signal(attempt_id, SignalKind::FaceVisibilityIssues, 3)
        .unwrap();
    attempts.submit_attempt(attempt_id, Utc::now()).unwrap();

    let reason = sessions
        .report(attempt_id)
        .unwrap()
        .invalid_reason
        .expect("reason");
    assert!(reason.contains("Face visibility"), "got {:?}", reason);
}

#[test]
fn threshold_boundary_is_inclusive() {
    // Exactly at the limit stays valid; one past it does not.
    let (attempts, sessions, attempt_id) = setup();
    sessions
        .increment_signal(attempt_id, SignalKind::LookAways, 3)
        .unwrap();
    attempts.submit_attempt(attempt_id, Utc::now()).unwrap();
    let report = sessions.report(attempt_id).unwrap();
    assert_eq!(report.is_valid_test, Some(true));

    let (attempts, sessions, attempt_id) = setup();
    sessions
        .increment_signal(attempt_id, SignalKind::LookAways, 4)
        .unwrap();
    attempts.submit_attempt(attempt_id, Utc::now()).unwrap();
    let report = sessions.report(attempt_id).unwrap();
    assert_eq!(report.is_valid_test, Some(false));
    assert!(report.invalid_reason.unwrap().contains("Look-aways"));
}

#[test]
fn counters_freeze_after_submission() {
    let (attempts, sessions, attempt_id) = setup();
    sessions
        .increment_signal(attempt_id, SignalKind::HeadsTurned, 2)
        .unwrap();
    attempts.submit_attempt(attempt_id, Utc::now()).unwrap();

    let err = sessions
        .increment_signal(attempt_id, SignalKind::HeadsTurned, 1)
        .unwrap_err();
    assert!(matches!(err, Error::AttemptAlreadySubmitted(_)));

    let report = sessions.report(attempt_id).unwrap();
    assert_eq!(report.heads_turned, 2);
}

#[test]
fn concurrent_reporters_lose_no_increments() {
    let (_attempts, sessions, attempt_id) = setup();
    let mut handles = Vec::new();
    for _ in 0..8 {
        let sessions = sessions.clone();
        handles.push(std::thread::spawn(move || {
            for _ in 0..10 {
                sessions
                    .increment_signal(attempt_id, SignalKind::HeadTilts, 1)
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    let report = sessions.report(attempt_id).unwrap();
    assert_eq!(report.head_tilts, 80);
}
