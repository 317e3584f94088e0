//! Chat Wire Format
//!
//! Decoding of inbound chat frames, encoding of broadcasts, and the close
//! frames the gateway sends.

use std::sync::Arc;

use axum::extract::ws::{close_code, CloseFrame, Message};

use super::registry::Payload;
use crate::application::dto::{ChatMessageFrame, ChatMessageResponse};
use crate::domain::ChatMessage;

/// Close reason sent when the path does not carry a usable group id
pub const MISSING_GROUP_REASON: &str = "Missing groupId";

/// Close reason sent when the group is at its connection limit
pub const GROUP_FULL_REASON: &str = "Group connection limit reached";

/// Parse the `{groupId}` path segment. Only positive integers are accepted.
pub fn parse_group_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Decode one text frame into a chat message frame.
pub fn decode_frame(text: &str) -> Result<ChatMessageFrame, serde_json::Error> {
    serde_json::from_str(text)
}

/// Encode a persisted message for broadcast.
pub fn encode_message(message: ChatMessage) -> Result<Payload, serde_json::Error> {
    let body = serde_json::to_string(&ChatMessageResponse::from(message))?;
    Ok(Arc::from(body))
}

/// Close frame for a connection whose group id is unusable (1003).
pub fn missing_group_close() -> Message {
    Message::Close(Some(CloseFrame {
        code: close_code::UNSUPPORTED,
        reason: MISSING_GROUP_REASON.into(),
    }))
}

/// Close frame for a connection refused by admission control (1013).
pub fn group_full_close() -> Message {
    Message::Close(Some(CloseFrame {
        code: close_code::AGAIN,
        reason: GROUP_FULL_REASON.into(),
    }))
}
