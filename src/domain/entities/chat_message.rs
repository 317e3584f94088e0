//! Chat message entity and store trait.
//!
//! Maps to the `chat_messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::shared::error::AppError;

/// A message posted to a group chat.
///
/// Maps to the `chat_messages` table:
/// - token: TEXT PRIMARY KEY (client-generated, e.g. a UUID)
/// - group_id: BIGINT NOT NULL
/// - sender_id: BIGINT NOT NULL
/// - text: TEXT NOT NULL
/// - timestamp: TIMESTAMPTZ NOT NULL
/// - reply_to_token: TEXT NULL
/// - seq: BIGSERIAL (insertion order, used as the ordering tie-breaker)
///
/// Messages are never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Client-generated unique key
    pub token: String,

    /// Group the message was posted to
    pub group_id: i64,

    /// Author user ID
    pub sender_id: i64,

    /// Message body
    pub text: String,

    /// When the message was sent
    pub timestamp: DateTime<Utc>,

    /// Token of the message this one replies to, if it existed at insert time
    pub reply_to_token: Option<String>,
}

impl ChatMessage {
    /// Check if this is a reply message.
    pub fn is_reply(&self) -> bool {
        self.reply_to_token.is_some()
    }

    /// Canonical wire form of the timestamp (`2024-01-01T00:00:00Z`).
    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

/// Durable storage for chat messages.
///
/// Each method is a single atomic operation against the backing store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert a new message and return the record as persisted.
    ///
    /// Fails with a unique violation if `token` already exists. The reply
    /// reference is re-resolved as part of the insert, so the returned
    /// `reply_to_token` is `None` when the target has vanished meanwhile.
    async fn insert(&self, message: &ChatMessage) -> Result<ChatMessage, AppError>;

    /// Find a message by its token.
    async fn find_by_token(&self, token: &str) -> Result<Option<ChatMessage>, AppError>;

    /// All messages of a group, oldest first, ties in insertion order.
    async fn select_by_group(&self, group_id: i64) -> Result<Vec<ChatMessage>, AppError>;

    /// Delete a message. Returns whether a record was removed.
    async fn delete_by_token(&self, token: &str) -> Result<bool, AppError>;
}
