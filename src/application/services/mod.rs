//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **ChatService**: Message persistence, history, deletion and participants

pub mod chat_service;

pub use chat_service::{parse_timestamp, ChatError, ChatService, ChatServiceImpl, SaveMessageDto};

#[cfg(test)]
pub use chat_service::MockChatService;
