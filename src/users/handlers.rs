use anyhow::Context;
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    extractors::{UserId, ValidatedJson},
    state::AppState,
};

use super::dto::{MessageResponse, UserCreate, UserResponse, UserUpdate};

const RESOURCE: &str = "User";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.store.list().await?;
    info!(count = users.len(), "retrieved users");
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.store.get(id).await?;
    let Some(user) = user else {
        warn!(user_id = id, "user not found");
        return Err(AppError::NotFound(RESOURCE));
    };
    info!(user_id = id, "retrieved user");
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UserCreate>,
) -> Result<(StatusCode, HeaderMap, Json<UserResponse>), AppError> {
    let user = state.store.insert(payload).await?;
    info!(user_id = user.id, "user created");

    let location = HeaderValue::from_str(&format!("/users/{}", user.id))
        .context("build Location header")?;
    let mut headers = HeaderMap::new();
    headers.insert(header::LOCATION, location);
    Ok((StatusCode::CREATED, headers, Json(user.into())))
}

#[instrument(skip(state, patch))]
pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    ValidatedJson(patch): ValidatedJson<UserUpdate>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.store.update(id, patch).await?;
    let Some(user) = user else {
        warn!(user_id = id, "user not found for update");
        return Err(AppError::NotFound(RESOURCE));
    };
    info!(user_id = id, "user updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = state.store.delete(id).await?;
    if !deleted {
        warn!(user_id = id, "user not found for deletion");
        return Err(AppError::NotFound(RESOURCE));
    }
    info!(user_id = id, "user deleted");
    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}
