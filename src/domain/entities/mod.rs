//! # Domain Entities
//!
//! - **ChatMessage**: A message posted to a group chat, keyed by a
//!   client-generated token
//! - **User**: A registered account, used to resolve chat participants
//!
//! ## Collaborator Traits
//!
//! - **MessageStore**: durable chat message storage
//! - **GroupMembership**: which users belong to a group
//! - **UserRepository**: user lookup by id
//!
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod chat_message;
mod group;
mod user;

pub use chat_message::{ChatMessage, MessageStore};
pub use group::GroupMembership;
pub use user::{User, UserRepository};

#[cfg(test)]
pub use chat_message::MockMessageStore;
#[cfg(test)]
pub use group::MockGroupMembership;
#[cfg(test)]
pub use user::MockUserRepository;
