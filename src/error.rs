use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Test is not open for attempts at this time")]
    OutsideWindow,

    #[error("Test is not published")]
    NotPublished,

    #[error("Maximum of {0} attempts reached for this test")]
    AttemptLimitExceeded(i32),

    #[error("Attempt {0} not found")]
    AttemptNotFound(Uuid),

    #[error("Attempt {0} has already been submitted")]
    AttemptAlreadySubmitted(Uuid),

    #[error("Question {0} does not belong to this test")]
    QuestionNotInTest(i32),
}

impl Error {
    /// Stable machine-readable code surfaced alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::BadRequest(_) => "bad_request",
            Error::NotFound(_) => "not_found",
            Error::Validation(_) => "validation_error",
            Error::Json(_) => "invalid_json",
            Error::Anyhow(_) => "bad_request",
            Error::Internal(_) => "internal_error",
            Error::Io(_) => "internal_error",
            Error::OutsideWindow => "outside_window",
            Error::NotPublished => "not_published",
            Error::AttemptLimitExceeded(_) => "attempt_limit_exceeded",
            Error::AttemptNotFound(_) => "attempt_not_found",
            Error::AttemptAlreadySubmitted(_) => "attempt_already_submitted",
            Error::QuestionNotInTest(_) => "question_not_in_test",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::Anyhow(_) => StatusCode::BAD_REQUEST,
            Error::OutsideWindow => StatusCode::FORBIDDEN,
            Error::NotPublished => StatusCode::FORBIDDEN,
            Error::AttemptLimitExceeded(_) => StatusCode::FORBIDDEN,
            Error::AttemptNotFound(_) => StatusCode::NOT_FOUND,
            Error::AttemptAlreadySubmitted(_) => StatusCode::CONFLICT,
            Error::QuestionNotInTest(_) => StatusCode::BAD_REQUEST,
            Error::Config(_) | Error::Internal(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
