//! WebSocket Session Management

use std::time::{Duration, Instant};

use super::registry::ConnectionId;

/// Lifecycle of a chat connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// Upgraded, not yet registered
    Connecting,
    /// Registered and reading frames
    Open,
    /// Unregistered; terminal
    Closed,
}

/// Per-connection bookkeeping kept by the read loop
#[derive(Debug)]
pub struct SessionState {
    pub group_id: i64,
    pub connection_id: ConnectionId,
    pub phase: ConnectionPhase,
    pub frames_received: u64,
    pub frames_rejected: u64,
    opened_at: Instant,
}

impl SessionState {
    pub fn new(group_id: i64, connection_id: ConnectionId) -> Self {
        Self {
            group_id,
            connection_id,
            phase: ConnectionPhase::Connecting,
            frames_received: 0,
            frames_rejected: 0,
            opened_at: Instant::now(),
        }
    }

    pub fn open(&mut self) {
        self.phase = ConnectionPhase::Open;
    }

    pub fn close(&mut self) {
        self.phase = ConnectionPhase::Closed;
    }

    pub fn frame_accepted(&mut self) {
        self.frames_received += 1;
    }

    pub fn frame_rejected(&mut self) {
        self.frames_received += 1;
        self.frames_rejected += 1;
    }

    pub fn uptime(&self) -> Duration {
        self.opened_at.elapsed()
    }
}
