//! In-Memory Repositories
//!
//! Process-local implementations of the chat collaborators. Used by the
//! `memory` storage backend and by tests. Nothing survives a restart.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::domain::{ChatMessage, GroupMembership, MessageStore, User, UserRepository};
use crate::shared::error::AppError;

/// Chat message store backed by an append-only vector.
///
/// A single mutex covers the duplicate check, reply resolution and append, so
/// every operation is atomic with respect to the others.
#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: Mutex<Vec<ChatMessage>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages across all groups.
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn insert(&self, message: &ChatMessage) -> Result<ChatMessage, AppError> {
        let mut messages = self.messages.lock();

        if messages.iter().any(|m| m.token == message.token) {
            return Err(AppError::Conflict(format!(
                "Message with token '{}' already exists",
                message.token
            )));
        }

        let reply_to_token = message.reply_to_token.as_ref().and_then(|reply| {
            messages
                .iter()
                .find(|m| &m.token == reply && m.group_id == message.group_id)
                .map(|m| m.token.clone())
        });

        let stored = ChatMessage {
            reply_to_token,
            ..message.clone()
        };
        messages.push(stored.clone());

        Ok(stored)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ChatMessage>, AppError> {
        Ok(self
            .messages
            .lock()
            .iter()
            .find(|m| m.token == token)
            .cloned())
    }

    async fn select_by_group(&self, group_id: i64) -> Result<Vec<ChatMessage>, AppError> {
        let mut selected: Vec<ChatMessage> = self
            .messages
            .lock()
            .iter()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();

        // Stable sort: equal timestamps keep insertion order.
        selected.sort_by_key(|m| m.timestamp);
        Ok(selected)
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, AppError> {
        let mut messages = self.messages.lock();
        let before = messages.len();
        messages.retain(|m| m.token != token);
        Ok(messages.len() != before)
    }
}

/// Group membership table kept in memory.
#[derive(Default)]
pub struct InMemoryGroupMembership {
    groups: RwLock<HashMap<i64, BTreeSet<i64>>>,
}

impl InMemoryGroupMembership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&self, group_id: i64, user_id: i64) {
        self.groups.write().entry(group_id).or_default().insert(user_id);
    }
}

#[async_trait]
impl GroupMembership for InMemoryGroupMembership {
    async fn members_of(&self, group_id: i64) -> Result<BTreeSet<i64>, AppError> {
        Ok(self.groups.read().get(&group_id).cloned().unwrap_or_default())
    }
}

/// User directory kept in memory.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<BTreeMap<i64, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.users.write().insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AppError> {
        let users = self.users.read();
        Ok(users
            .values()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }
}
