//! Response DTOs
//!
//! Outbound payloads for HTTP responses and WebSocket broadcasts.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, User};

/// Persisted chat message as sent to clients.
///
/// Same shape as the inbound frame; `replyToToken` is always present and is
/// `null` when the reference did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub token: String,
    pub group_id: i64,
    pub sender_id: i64,
    pub text: String,
    pub timestamp: String,
    pub reply_to_token: Option<String>,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(message: ChatMessage) -> Self {
        let timestamp = message.timestamp_rfc3339();
        Self {
            token: message.token,
            group_id: message.group_id,
            sender_id: message.sender_id,
            text: message.text,
            timestamp,
            reply_to_token: message.reply_to_token,
        }
    }
}

/// Group participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

/// Plain acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
