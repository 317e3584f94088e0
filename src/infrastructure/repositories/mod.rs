//! Repository Implementations
//!
//! Concrete implementations of the domain collaborator traits.
//!
//! ## Available Repositories
//!
//! - **PgChatMessageRepository** - Chat messages keyed by client token
//! - **PgGroupMemberRepository** - Group membership lookup
//! - **PgUserRepository** - User lookup for chat participants
//! - **InMemory\*** - Process-local equivalents of the above
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{
//!     PgChatMessageRepository, PgGroupMemberRepository, PgUserRepository,
//! };
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let messages = PgChatMessageRepository::new(pool.clone());
//!     let members = PgGroupMemberRepository::new(pool.clone());
//!     let users = PgUserRepository::new(pool.clone());
//! }
//! ```

pub mod chat_message_repository;
pub mod group_member_repository;
pub mod memory;
pub mod user_repository;

pub use chat_message_repository::PgChatMessageRepository;
pub use group_member_repository::PgGroupMemberRepository;
pub use memory::{InMemoryGroupMembership, InMemoryMessageStore, InMemoryUserRepository};
pub use user_repository::PgUserRepository;
