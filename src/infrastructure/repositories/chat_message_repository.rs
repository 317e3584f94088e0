//! Chat Message Repository Implementation
//!
//! PostgreSQL implementation of the chat message store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{ChatMessage, MessageStore};
use crate::shared::error::AppError;

/// PostgreSQL chat message store.
///
/// The `token` primary key is the authoritative duplicate guard; history is
/// ordered by `timestamp` then `seq` (insertion order).
pub struct PgChatMessageRepository {
    pool: PgPool,
}

impl PgChatMessageRepository {
    /// Creates a new PgChatMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for chat message queries.
#[derive(Debug, sqlx::FromRow)]
struct ChatMessageRow {
    token: String,
    group_id: i64,
    sender_id: i64,
    text: String,
    timestamp: DateTime<Utc>,
    reply_to_token: Option<String>,
}

impl From<ChatMessageRow> for ChatMessage {
    fn from(row: ChatMessageRow) -> Self {
        ChatMessage {
            token: row.token,
            group_id: row.group_id,
            sender_id: row.sender_id,
            text: row.text,
            timestamp: row.timestamp,
            reply_to_token: row.reply_to_token,
        }
    }
}

#[async_trait]
impl MessageStore for PgChatMessageRepository {
    /// Insert a message in one statement.
    ///
    /// The reply reference is looked up again inside the INSERT so a target
    /// deleted after the service-level check is stored as NULL.
    async fn insert(&self, message: &ChatMessage) -> Result<ChatMessage, AppError> {
        let row = sqlx::query_as::<_, ChatMessageRow>(
            r#"
            INSERT INTO chat_messages (token, group_id, sender_id, text, "timestamp", reply_to_token)
            VALUES (
                $1, $2, $3, $4, $5,
                (SELECT r.token FROM chat_messages r WHERE r.token = $6 AND r.group_id = $2)
            )
            RETURNING token, group_id, sender_id, text, "timestamp", reply_to_token
            "#,
        )
        .bind(&message.token)
        .bind(message.group_id)
        .bind(message.sender_id)
        .bind(&message.text)
        .bind(message.timestamp)
        .bind(message.reply_to_token.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(ChatMessage::from(row))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ChatMessage>, AppError> {
        let row = sqlx::query_as::<_, ChatMessageRow>(
            r#"
            SELECT token, group_id, sender_id, text, "timestamp", reply_to_token
            FROM chat_messages
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ChatMessage::from))
    }

    async fn select_by_group(&self, group_id: i64) -> Result<Vec<ChatMessage>, AppError> {
        let rows = sqlx::query_as::<_, ChatMessageRow>(
            r#"
            SELECT token, group_id, sender_id, text, "timestamp", reply_to_token
            FROM chat_messages
            WHERE group_id = $1
            ORDER BY "timestamp" ASC, seq ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ChatMessage::from).collect())
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
