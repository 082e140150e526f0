// src/error.rs
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use log::error;
use thiserror::Error;

/// Failures surfaced by the store, the services and the HTTP layer.
#[derive(Debug, Error)]
pub enum BlogError {
    /// Uniqueness, self-follow, foreign key or required-field breach.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("post text must not be empty")]
    EmptyText,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Request body that could not be decoded.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("storage error: {0}")]
    Storage(String),
}

pub type BlogResult<T> = Result<T, BlogError>;

impl BlogError {
    pub fn constraint(msg: impl Into<String>) -> Self {
        BlogError::ConstraintViolation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        BlogError::NotFound(msg.into())
    }
}

// SQLSTATE codes reported as constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NOT_NULL_VIOLATION: &str = "23502";
// value too long for a VARCHAR(n) column
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

fn is_constraint_code(code: &str) -> bool {
    matches!(
        code,
        UNIQUE_VIOLATION
            | CHECK_VIOLATION
            | FOREIGN_KEY_VIOLATION
            | NOT_NULL_VIOLATION
            | STRING_DATA_RIGHT_TRUNCATION
    )
}

impl From<tokio_postgres::Error> for BlogError {
    fn from(e: tokio_postgres::Error) -> Self {
        if let Some(db) = e.as_db_error() {
            if is_constraint_code(db.code().code()) {
                let what = db.constraint().unwrap_or(db.message());
                return BlogError::ConstraintViolation(what.to_string());
            }
        }
        BlogError::Storage(e.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for BlogError {
    fn from(e: deadpool_postgres::PoolError) -> Self {
        BlogError::Storage(format!("pool: {}", e))
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
    data: Option<()>,
}

impl ResponseError for BlogError {
    fn status_code(&self) -> StatusCode {
        match self {
            BlogError::ConstraintViolation(_) => StatusCode::CONFLICT,
            BlogError::NotFound(_) => StatusCode::NOT_FOUND,
            BlogError::Forbidden(_) => StatusCode::FORBIDDEN,
            BlogError::EmptyText => StatusCode::BAD_REQUEST,
            BlogError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            BlogError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            BlogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            BlogError::Storage(detail) => {
                error!("storage failure: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            status: "error",
            message,
            data: None,
        })
    }
}
