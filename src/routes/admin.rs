use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::attempt_dto::AttemptDetailResponse;
use crate::dto::test_dto::{
    CreateQuestionPayload, CreateTestPayload, TestWithQuestions, UpdateQuestionPayload,
    UpdateTestPayload,
};
use crate::AppState;

#[axum::debug_handler]
pub async fn create_test(
    State(state): State<AppState>,
    Json(payload): Json<CreateTestPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let test = state.test_service.create_test(payload, Utc::now())?;
    Ok((StatusCode::CREATED, Json(test)).into_response())
}

#[axum::debug_handler]
pub async fn list_tests(State(state): State<AppState>) -> crate::error::Result<Response> {
    Ok(Json(state.test_service.list_tests()).into_response())
}

#[axum::debug_handler]
pub async fn get_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let record = state.test_service.get_test(test_id)?;
    let response = TestWithQuestions {
        test: record.test,
        questions: record.questions.into_values().collect(),
    };
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn update_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
    Json(payload): Json<UpdateTestPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let test = state.test_service.update_test(test_id, payload, Utc::now())?;
    Ok(Json(test).into_response())
}

#[axum::debug_handler]
pub async fn delete_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    if !state.attempt_service.attempts_for_test(test_id).is_empty() {
        return Err(crate::error::Error::BadRequest(
            "Cannot delete a test with recorded attempts".to_string(),
        ));
    }
    state.test_service.delete_test(test_id)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn add_question(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
    Json(payload): Json<CreateQuestionPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let question = state
        .test_service
        .add_question(test_id, payload, Utc::now())?;
    Ok((StatusCode::CREATED, Json(question)).into_response())
}

#[axum::debug_handler]
pub async fn update_question(
    State(state): State<AppState>,
    Path((test_id, question_id)): Path<(Uuid, i32)>,
    Json(payload): Json<UpdateQuestionPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let question =
        state
            .test_service
            .update_question(test_id, question_id, payload, Utc::now())?;
    Ok(Json(question).into_response())
}

#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Path((test_id, question_id)): Path<(Uuid, i32)>,
) -> crate::error::Result<Response> {
    state
        .test_service
        .delete_question(test_id, question_id, Utc::now())?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn list_test_results(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    Ok(Json(state.attempt_service.results_for_test(test_id)?).into_response())
}

#[axum::debug_handler]
pub async fn get_attempt(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let (attempt, answers, session_report) = state.attempt_service.get_attempt(attempt_id)?;
    Ok(Json(AttemptDetailResponse {
        attempt,
        answers,
        session_report,
    })
    .into_response())
}
