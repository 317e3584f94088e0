//! Request DTOs
//!
//! Inbound payloads. Field names are camelCase on the wire.

use serde::Deserialize;

use crate::application::services::SaveMessageDto;

/// Chat message frame sent by a client over the group WebSocket.
///
/// ```json
/// {"token":"t1","groupId":42,"senderId":7,"text":"hi",
///  "timestamp":"2024-01-01T00:00:00Z","replyToToken":null}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageFrame {
    pub token: String,
    pub group_id: i64,
    pub sender_id: i64,
    pub text: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub reply_to_token: Option<String>,
}

impl From<ChatMessageFrame> for SaveMessageDto {
    fn from(frame: ChatMessageFrame) -> Self {
        Self {
            token: frame.token,
            group_id: frame.group_id,
            sender_id: frame.sender_id,
            text: frame.text,
            timestamp: frame.timestamp,
            reply_to_token: frame.reply_to_token,
        }
    }
}
