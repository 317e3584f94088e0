//! Connection Registry
//!
//! Tracks, per group, the live chat connections and fans payloads out to
//! them. Owned by the gateway and shared through `AppState`; there is no
//! process-global map.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::infrastructure::metrics;

/// Identifies one connection for its whole lifetime.
pub type ConnectionId = Uuid;

/// Serialized frame queued for a connection's writer task.
pub type Payload = Arc<str>;

/// Sending half of a live connection.
///
/// The receiving half is drained by the connection's writer task; once that
/// task stops, sends fail and the registry evicts the handle.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<Payload>,
}

impl ConnectionHandle {
    pub fn new(sender: mpsc::UnboundedSender<Payload>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
        }
    }

    /// Create a handle together with the receiver its writer task drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Payload>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    fn send(&self, payload: Payload) -> Result<(), mpsc::error::SendError<Payload>> {
        self.sender.send(payload)
    }
}

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Group {group_id} already has {limit} open chat connections")]
    GroupFull { group_id: i64, limit: usize },
}

/// Result of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections the payload was queued for
    pub delivered: usize,
    /// Connections whose send failed (and were evicted)
    pub failed: usize,
}

/// Per-group registry of live connections.
///
/// `DashMap` shards give mutual exclusion per group; broadcasts copy the
/// group's handles out and send without holding the shard lock.
pub struct ConnectionRegistry {
    groups: DashMap<i64, HashMap<ConnectionId, ConnectionHandle>>,
    max_per_group: Option<usize>,
}

impl ConnectionRegistry {
    /// Registry without admission control.
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Registry that refuses connections beyond `max_per_group` per group.
    pub fn with_limit(max_per_group: Option<usize>) -> Self {
        Self {
            groups: DashMap::new(),
            max_per_group,
        }
    }

    /// Add a connection to a group, creating the group entry if needed.
    pub fn register(&self, group_id: i64, handle: ConnectionHandle) -> Result<(), RegistryError> {
        let connection_id = handle.id();
        {
            let mut connections = self.groups.entry(group_id).or_default();
            if let Some(limit) = self.max_per_group {
                if connections.len() >= limit {
                    return Err(RegistryError::GroupFull { group_id, limit });
                }
            }
            connections.insert(connection_id, handle);
        }

        metrics::chat_connection_opened();
        tracing::info!(
            group_id = group_id,
            connection_id = %connection_id,
            "Chat connection registered"
        );
        Ok(())
    }

    /// Register and return a guard that unregisters on drop.
    pub fn register_guarded(
        self: &Arc<Self>,
        group_id: i64,
        handle: ConnectionHandle,
    ) -> Result<Registration, RegistryError> {
        let connection_id = handle.id();
        self.register(group_id, handle)?;
        Ok(Registration {
            registry: Arc::clone(self),
            group_id,
            connection_id,
        })
    }

    /// Remove a connection. Returns whether it was registered.
    ///
    /// Safe to call repeatedly and after the group entry is gone. Empty group
    /// entries are pruned.
    pub fn unregister(&self, group_id: i64, connection_id: ConnectionId) -> bool {
        let removed = match self.groups.get_mut(&group_id) {
            Some(mut connections) => connections.remove(&connection_id).is_some(),
            None => false,
        };
        self.groups
            .remove_if(&group_id, |_, connections| connections.is_empty());

        if removed {
            metrics::chat_connection_closed();
            tracing::info!(
                group_id = group_id,
                connection_id = %connection_id,
                "Chat connection unregistered"
            );
        }
        removed
    }

    /// Send `payload` to every connection of the group.
    ///
    /// A failed send evicts that connection and does not affect the others.
    pub fn broadcast(&self, group_id: i64, payload: Payload) -> BroadcastReport {
        let snapshot: Vec<ConnectionHandle> = match self.groups.get(&group_id) {
            Some(connections) => connections.values().cloned().collect(),
            None => Vec::new(),
        };

        let mut report = BroadcastReport::default();
        for handle in snapshot {
            match handle.send(Arc::clone(&payload)) {
                Ok(()) => report.delivered += 1,
                Err(_) => {
                    report.failed += 1;
                    metrics::record_broadcast_failure();
                    tracing::warn!(
                        group_id = group_id,
                        connection_id = %handle.id(),
                        "Broadcast send failed, dropping connection"
                    );
                    self.unregister(group_id, handle.id());
                }
            }
        }

        report
    }

    /// Whether a connection is currently registered for the group.
    pub fn contains(&self, group_id: i64, connection_id: ConnectionId) -> bool {
        self.groups
            .get(&group_id)
            .map(|connections| connections.contains_key(&connection_id))
            .unwrap_or(false)
    }

    /// Open connections for one group.
    pub fn connection_count(&self, group_id: i64) -> usize {
        self.groups
            .get(&group_id)
            .map(|connections| connections.len())
            .unwrap_or(0)
    }

    /// Open connections across all groups.
    pub fn total_connections(&self) -> usize {
        self.groups.iter().map(|entry| entry.value().len()).sum()
    }

    /// Groups with at least one open connection.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registration of one connection; unregisters when dropped.
///
/// Dropping happens on every exit from the read loop, including early
/// returns, errors and panics.
pub struct Registration {
    registry: Arc<ConnectionRegistry>,
    group_id: i64,
    connection_id: ConnectionId,
}

impl Registration {
    pub fn group_id(&self) -> i64 {
        self.group_id
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.unregister(self.group_id, self.connection_id);
    }
}
