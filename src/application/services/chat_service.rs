//! Chat Service
//!
//! Validates and persists group chat messages, resolves reply references,
//! serves ordered history and handles deletion.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use validator::Validate;

use crate::domain::{ChatMessage, GroupMembership, MessageStore, User, UserRepository};
use crate::shared::error::AppError;
use crate::shared::validation::{field_errors, not_blank};

/// Order in which violated fields are reported.
const FIELD_PRIORITY: &[&str] = &["group_id", "sender_id", "text", "token"];

/// Chat service trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Get all messages of a group, oldest first
    async fn get_messages_by_group(&self, group_id: i64) -> Result<Vec<ChatMessage>, ChatError>;

    /// Get the IDs of the users belonging to a group
    async fn get_group_user_ids(&self, group_id: i64) -> Result<BTreeSet<i64>, ChatError>;

    /// Get the users participating in a group's chat
    async fn get_group_users(&self, group_id: i64) -> Result<Vec<User>, ChatError>;

    /// Validate and persist a message
    async fn save_message(&self, request: SaveMessageDto) -> Result<ChatMessage, ChatError>;

    /// Delete a message by token. Deleting an unknown token succeeds.
    async fn delete_message(&self, token: &str) -> Result<(), ChatError>;
}

/// Save message request
#[derive(Debug, Clone, Validate)]
pub struct SaveMessageDto {
    #[validate(custom(function = "not_blank", message = "Message token cannot be blank"))]
    pub token: String,

    #[validate(range(min = 1, message = "Invalid groupId"))]
    pub group_id: i64,

    #[validate(range(min = 1, message = "Invalid senderId"))]
    pub sender_id: i64,

    #[validate(custom(function = "not_blank", message = "Message text cannot be blank"))]
    pub text: String,

    /// ISO-8601 send time from the client; blank means "now"
    pub timestamp: String,

    pub reply_to_token: Option<String>,
}

/// Chat service errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("{message}")]
    InvalidArgument { field: String, message: String },

    #[error("Message with token '{0}' already exists")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<AppError> for ChatError {
    fn from(e: AppError) -> Self {
        ChatError::Internal(e.to_string())
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::InvalidArgument { field, message } => {
                AppError::Validation(format!("{}: {}", field, message))
            }
            ChatError::Conflict(token) => {
                AppError::Conflict(format!("Message with token '{}' already exists", token))
            }
            ChatError::NotFound(msg) => AppError::NotFound(msg),
            ChatError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Parse a client-supplied send time.
///
/// Accepts RFC 3339 and the zone-less `YYYY-MM-DDTHH:MM:SS[.fff]` form, which
/// is taken as UTC. A blank value yields the current server time.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ChatError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Utc::now());
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| ChatError::invalid("timestamp", format!("Invalid timestamp '{}'", raw)))
}

fn ensure_group_id(group_id: i64) -> Result<(), ChatError> {
    if group_id <= 0 {
        return Err(ChatError::invalid("group_id", "Invalid groupId"));
    }
    Ok(())
}

/// ChatService implementation
pub struct ChatServiceImpl<S, G, U>
where
    S: MessageStore,
    G: GroupMembership,
    U: UserRepository,
{
    store: Arc<S>,
    groups: Arc<G>,
    users: Arc<U>,
}

impl<S, G, U> ChatServiceImpl<S, G, U>
where
    S: MessageStore,
    G: GroupMembership,
    U: UserRepository,
{
    pub fn new(store: Arc<S>, groups: Arc<G>, users: Arc<U>) -> Self {
        Self {
            store,
            groups,
            users,
        }
    }

    /// Keep the reply reference only if it points at a stored message of the
    /// same group.
    async fn resolve_reply(
        &self,
        group_id: i64,
        reply_to_token: Option<String>,
    ) -> Result<Option<String>, ChatError> {
        let Some(reply) = reply_to_token.filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };

        match self.store.find_by_token(&reply).await? {
            Some(target) if target.group_id == group_id => Ok(Some(reply)),
            _ => {
                tracing::debug!(
                    group_id = group_id,
                    reply_to_token = %reply,
                    "Dropping unresolved reply reference"
                );
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl<S, G, U> ChatService for ChatServiceImpl<S, G, U>
where
    S: MessageStore + 'static,
    G: GroupMembership + 'static,
    U: UserRepository + 'static,
{
    async fn get_messages_by_group(&self, group_id: i64) -> Result<Vec<ChatMessage>, ChatError> {
        ensure_group_id(group_id)?;

        let messages = self.store.select_by_group(group_id).await?;
        tracing::debug!(group_id = group_id, count = messages.len(), "Loaded chat history");

        Ok(messages)
    }

    async fn get_group_user_ids(&self, group_id: i64) -> Result<BTreeSet<i64>, ChatError> {
        ensure_group_id(group_id)?;

        Ok(self.groups.members_of(group_id).await?)
    }

    async fn get_group_users(&self, group_id: i64) -> Result<Vec<User>, ChatError> {
        let member_ids = self.get_group_user_ids(group_id).await?;
        if member_ids.is_empty() {
            return Err(ChatError::NotFound(format!(
                "No members found for group {}",
                group_id
            )));
        }

        let ids: Vec<i64> = member_ids.into_iter().collect();
        Ok(self.users.find_by_ids(&ids).await?)
    }

    async fn save_message(&self, request: SaveMessageDto) -> Result<ChatMessage, ChatError> {
        if let Err(errors) = request.validate() {
            let first = field_errors(&errors, FIELD_PRIORITY)
                .into_iter()
                .next()
                .map(|e| ChatError::InvalidArgument {
                    field: e.field,
                    message: e.message,
                })
                .unwrap_or_else(|| ChatError::invalid("message", "Validation failed"));
            return Err(first);
        }

        let timestamp = parse_timestamp(&request.timestamp)?;

        if self.store.find_by_token(&request.token).await?.is_some() {
            return Err(ChatError::Conflict(request.token));
        }

        let reply_to_token = self
            .resolve_reply(request.group_id, request.reply_to_token)
            .await?;

        let message = ChatMessage {
            token: request.token,
            group_id: request.group_id,
            sender_id: request.sender_id,
            text: request.text,
            timestamp,
            reply_to_token,
        };

        let saved = self.store.insert(&message).await.map_err(|e| {
            if e.is_unique_violation() {
                ChatError::Conflict(message.token.clone())
            } else {
                ChatError::from(e)
            }
        })?;

        tracing::info!(
            token = %saved.token,
            group_id = saved.group_id,
            sender_id = saved.sender_id,
            reply = saved.is_reply(),
            "Chat message saved"
        );

        Ok(saved)
    }

    async fn delete_message(&self, token: &str) -> Result<(), ChatError> {
        if not_blank(token).is_err() {
            return Err(ChatError::invalid("token", "Invalid message token"));
        }

        let removed = self.store.delete_by_token(token).await?;
        tracing::info!(token = %token, removed = removed, "Chat message delete");

        Ok(())
    }
}
