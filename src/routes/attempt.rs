use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::attempt_dto::{
    PublicQuestionView, RecordAnswerRequest, RecordAnswerResponse, SignalRequest, SignalResponse,
    StartAttemptRequest, StartAttemptResponse, SubmitAttemptResponse,
};
use crate::AppState;

#[axum::debug_handler]
pub async fn start_attempt(
    State(state): State<AppState>,
    Json(req): Json<StartAttemptRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let started = state
        .attempt_service
        .start_attempt(req.user.into(), req.test_id, Utc::now())?;
    let response = StartAttemptResponse {
        session_report_id: started.report.id,
        questions: started
            .questions
            .iter()
            .map(PublicQuestionView::from_question)
            .collect(),
        attempt: started.attempt,
    };
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn record_answer(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
    Json(req): Json<RecordAnswerRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let timestamp = state.attempt_service.record_answer(
        attempt_id,
        req.question_id,
        req.answer_text,
        Utc::now(),
    )?;
    Ok(Json(RecordAnswerResponse {
        saved: true,
        question_id: req.question_id,
        timestamp,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn increment_signal(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
    Json(req): Json<SignalRequest>,
) -> crate::error::Result<Response> {
    let total = state
        .session_service
        .increment_signal(attempt_id, req.kind, req.delta)?;
    Ok(Json(SignalResponse {
        recorded: true,
        kind: req.kind,
        total,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn submit_attempt(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let (attempt, report) = state.attempt_service.submit_attempt(attempt_id, Utc::now())?;
    let score = attempt.score.unwrap_or(0);
    let percentage = if attempt.max_score > 0 {
        (score as f64 / attempt.max_score as f64) * 100.0
    } else {
        0.0
    };
    let response = SubmitAttemptResponse {
        attempt_id: attempt.id,
        status: attempt.status,
        score,
        max_score: attempt.max_score,
        percentage,
        is_valid_test: report.is_valid_test.unwrap_or(false),
        invalid_reason: report.invalid_reason,
        message: "Attempt submitted and scored".to_string(),
    };
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let result = state.attempt_service.get_result(attempt_id)?;
    Ok(Json(result).into_response())
}

#[axum::debug_handler]
pub async fn attempts_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    Ok(Json(state.attempt_service.attempts_for_user(user_id)).into_response())
}

#[axum::debug_handler]
pub async fn attempts_for_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    Ok(Json(state.attempt_service.attempts_for_test(test_id)).into_response())
}
