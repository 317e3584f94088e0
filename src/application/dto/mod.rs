//! Data Transfer Objects
//!
//! DTOs for API and WebSocket payload serialization.

pub mod request;
pub mod response;

pub use request::ChatMessageFrame;
pub use response::{ChatMessageResponse, SuccessResponse, UserResponse};
