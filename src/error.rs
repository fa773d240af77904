use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

use crate::types::forms::{FormErrors, FormPage};

pub const WRONG_CREDENTIALS: &str = "Wrong email or password";

#[derive(Debug, ThisError)]
pub enum NotejamError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Blocking task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Submitted form did not pass validation or authentication; the form is
    /// redisplayed with its errors.
    #[error("Form `{}` rejected", .0.form)]
    Form(FormPage),

    /// Missing record, or a record owned by someone else.
    #[error("Not found")]
    NotFound,
}

impl NotejamError {
    pub fn invalid(form: &'static str, errors: FormErrors) -> Self {
        NotejamError::Form(FormPage {
            form,
            errors,
            message: None,
        })
    }

    /// Sign-in failure that does not say which of email or password was wrong.
    pub fn wrong_credentials() -> Self {
        NotejamError::Form(FormPage {
            form: "signin",
            errors: FormErrors::default(),
            message: Some(WRONG_CREDENTIALS.to_string()),
        })
    }
}

impl IntoResponse for NotejamError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            NotejamError::Form(page) => return (StatusCode::OK, Json(page)).into_response(),
            NotejamError::NotFound => {
                let status = StatusCode::NOT_FOUND;
                let body = ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: "The requested resource was not found.".to_string(),
                };
                (status, body)
            }
            NotejamError::DatabaseError(_)
            | NotejamError::PasswordHash(_)
            | NotejamError::TaskError(_)
            | NotejamError::Config(_) => {
                error!(error = %self, "request failed");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (status, body)
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
