//! Chat Handlers
//!
//! HTTP endpoints for chat history, deletion and group participants.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::dto::{ChatMessageResponse, SuccessResponse, UserResponse};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn parse_group_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("Invalid groupId '{}'", raw)))
}

/// Get a group's chat history, oldest first
/// GET /chat/{groupId}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<ChatMessageResponse>>, AppError> {
    let group_id = parse_group_id(&group_id)?;

    let messages = state.chat.get_messages_by_group(group_id).await?;

    Ok(Json(
        messages.into_iter().map(ChatMessageResponse::from).collect(),
    ))
}

/// Delete a message by token
/// DELETE /chat/{token}
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(token): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.chat.delete_message(&token).await?;

    tracing::info!(user_id = auth.user_id, token = %token, "Chat message delete requested");

    Ok(Json(SuccessResponse::new("Message deleted")))
}

/// Get the users of a group
/// GET /chat/{groupId}/users
pub async fn get_group_users(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let group_id = parse_group_id(&group_id)?;

    let users = state.chat.get_group_users(group_id).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
