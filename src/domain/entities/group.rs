//! Group membership lookup.
//!
//! Groups themselves are owned by the list/group service; the chat only needs
//! to know who belongs to one. Backed by the `group_members` table.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::shared::error::AppError;

/// Resolves the members of a group.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupMembership: Send + Sync {
    /// User IDs belonging to the group. Empty when the group is unknown.
    async fn members_of(&self, group_id: i64) -> Result<BTreeSet<i64>, AppError>;
}
