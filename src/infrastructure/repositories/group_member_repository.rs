//! Group Member Repository Implementation
//!
//! Reads the `group_members` join table.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::GroupMembership;
use crate::shared::error::AppError;

/// PostgreSQL group membership lookup.
pub struct PgGroupMemberRepository {
    pool: PgPool,
}

impl PgGroupMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupMembership for PgGroupMemberRepository {
    async fn members_of(&self, group_id: i64) -> Result<BTreeSet<i64>, AppError> {
        // Cast keeps decoding stable if the owning service uses INTEGER ids.
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT user_id::BIGINT FROM group_members WHERE group_id = $1",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }
}
