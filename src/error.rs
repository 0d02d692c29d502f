//! Typed request errors and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

pub const INTERNAL_ERROR_DETAIL: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error("unreadable request body: {1}")]
    UnreadableBody(StatusCode, String),
    #[error("invalid path parameter: {0}")]
    InvalidPath(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("database: {0}")]
    Persistence(#[from] sqlx::Error),
    #[error("internal: {0:#}")]
    Internal(#[from] anyhow::Error),
}

/// One offending input field in a 422 response.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: String,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: Detail,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidBody(_) | AppError::InvalidPath(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::UnreadableBody(status, _) => *status,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Detail {
        match self {
            AppError::Validation(errors) => Detail::Fields(field_errors(errors)),
            AppError::InvalidBody(message) => Detail::Fields(vec![FieldError {
                field: "body".into(),
                message: message.clone(),
                code: "invalid_body".into(),
            }]),
            AppError::InvalidPath(message) => Detail::Fields(vec![FieldError {
                field: "id".into(),
                message: message.clone(),
                code: "invalid_path".into(),
            }]),
            AppError::UnreadableBody(_, message) => Detail::Message(message.clone()),
            AppError::NotFound(_) => Detail::Message(self.to_string()),
            AppError::Persistence(_) | AppError::Internal(_) => {
                Detail::Message(INTERNAL_ERROR_DETAIL.into())
            }
        }
    }
}

/// Flattens validator output into a list sorted by field name.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| FieldError {
                field: field.clone(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field)),
                code: e.code.to_string(),
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// Body returned for every unexpected failure.
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            detail: Detail::Message(INTERNAL_ERROR_DETAIL.into()),
        }),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
            return internal_error_response();
        }
        (status, Json(ErrorBody { detail: self.detail() })).into_response()
    }
}
