//! Request extractors that reject with `AppError` instead of axum's plain-text rejections.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::error::AppError;

/// JSON object body that has been deserialized and passed `Validate`.
///
/// Syntax errors, non-object bodies, wrong primitive types, missing fields
/// and a missing `Content-Type: application/json` header all become 422
/// responses. Failures to read the body keep axum's status (413 for an
/// oversized body).
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(raw) = Json::<Value>::from_request(req, state)
            .await
            .map_err(body_rejection)?;
        // Derived struct deserializers also accept positional arrays.
        if !raw.is_object() {
            return Err(AppError::InvalidBody(
                "request body must be a JSON object".into(),
            ));
        }
        let bytes = serde_json::to_vec(&raw).map_err(|e| AppError::InvalidBody(e.to_string()))?;
        let Json(value) = Json::<T>::from_bytes(&bytes).map_err(body_rejection)?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

fn body_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::BytesRejection(e) => AppError::UnreadableBody(e.status(), e.body_text()),
        other => AppError::InvalidBody(other.body_text()),
    }
}

/// Integer `:id` path segment.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::InvalidPath(e.body_text()))?;
        Ok(UserId(id))
    }
}
