//! Chat Gateway
//!
//! Drives one group chat connection: every inbound text frame is decoded,
//! persisted through the chat service and fanned out to the group.

use std::fmt::Display;
use std::sync::Arc;

use axum::extract::ws::Message;
use futures::{Stream, StreamExt};

use super::messages::{decode_frame, encode_message};
use super::registry::{
    BroadcastReport, ConnectionHandle, ConnectionRegistry, Registration, RegistryError,
};
use super::session::SessionState;
use crate::application::services::{ChatError, ChatService};
use crate::infrastructure::metrics::{self, FrameOutcome};

/// Reasons an inbound frame produced no broadcast
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Malformed chat frame: {0}")]
    Malformed(serde_json::Error),

    #[error("Frame for group {actual} received on a group {expected} connection")]
    GroupMismatch { expected: i64, actual: i64 },

    #[error(transparent)]
    Rejected(#[from] ChatError),

    #[error("Failed to encode broadcast: {0}")]
    Encode(serde_json::Error),
}

impl FrameError {
    fn outcome(&self) -> FrameOutcome {
        match self {
            FrameError::Malformed(_) => FrameOutcome::Malformed,
            _ => FrameOutcome::Rejected,
        }
    }
}

/// Chat gateway shared by all connections
pub struct ChatGateway {
    chat: Arc<dyn ChatService>,
    registry: Arc<ConnectionRegistry>,
}

impl ChatGateway {
    pub fn new(chat: Arc<dyn ChatService>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { chat, registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Register a connection with its group.
    pub fn open(
        &self,
        group_id: i64,
        handle: ConnectionHandle,
    ) -> Result<Registration, RegistryError> {
        self.registry.register_guarded(group_id, handle)
    }

    /// Process one text frame received on a `group_id` connection.
    pub async fn handle_text(
        &self,
        group_id: i64,
        text: &str,
    ) -> Result<BroadcastReport, FrameError> {
        let frame = decode_frame(text).map_err(FrameError::Malformed)?;
        if frame.group_id != group_id {
            return Err(FrameError::GroupMismatch {
                expected: group_id,
                actual: frame.group_id,
            });
        }

        let saved = self.chat.save_message(frame.into()).await?;
        let payload = encode_message(saved).map_err(FrameError::Encode)?;

        Ok(self.registry.broadcast(group_id, payload))
    }

    /// Read frames until the peer closes or the transport fails.
    ///
    /// The registration is dropped on every exit path, which removes the
    /// connection from the registry.
    pub async fn run<S, E>(&self, registration: Registration, mut inbound: S) -> SessionState
    where
        S: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        let mut session = SessionState::new(registration.group_id(), registration.connection_id());
        session.open();

        while let Some(message) = inbound.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    match self.handle_text(session.group_id, text.as_str()).await {
                        Ok(report) => {
                            session.frame_accepted();
                            metrics::record_chat_frame(FrameOutcome::Saved);
                            tracing::debug!(
                                group_id = session.group_id,
                                connection_id = %session.connection_id,
                                delivered = report.delivered,
                                failed = report.failed,
                                "Chat message broadcast"
                            );
                        }
                        Err(e) => {
                            session.frame_rejected();
                            metrics::record_chat_frame(e.outcome());
                            tracing::warn!(
                                group_id = session.group_id,
                                connection_id = %session.connection_id,
                                error = %e,
                                "Chat frame dropped"
                            );
                        }
                    }
                }
                Ok(Message::Close(frame)) => {
                    tracing::debug!(
                        connection_id = %session.connection_id,
                        close = ?frame,
                        "Peer closed chat connection"
                    );
                    break;
                }
                Ok(_) => {
                    // Binary, ping and pong frames carry no chat data.
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %session.connection_id,
                        error = %e,
                        "Chat connection error"
                    );
                    break;
                }
            }
        }

        drop(registration);
        session.close();

        tracing::info!(
            group_id = session.group_id,
            connection_id = %session.connection_id,
            frames = session.frames_received,
            rejected = session.frames_rejected,
            uptime_ms = session.uptime().as_millis() as u64,
            "Chat connection closed"
        );

        session
    }
}
