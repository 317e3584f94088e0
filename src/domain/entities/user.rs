//! User entity and repository trait.
//!
//! Maps to the `users` table. Accounts are created by the auth flow; the chat
//! only reads them to describe group participants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::shared::error::AppError;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for user lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find users by ID. Unknown IDs are skipped; results are ordered by ID.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AppError>;
}
