//! WebSocket Connection Handler
//!
//! Upgrades `GET /chat/{groupId}` and runs the connection against the chat
//! gateway.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use super::messages::{group_full_close, missing_group_close, parse_group_id};
use super::registry::ConnectionHandle;
use crate::presentation::middleware::auth::AuthUser;
use crate::startup::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(raw_group_id): Path<String>,
    State(state): State<AppState>,
    auth: AuthUser,
) -> Response {
    let limits = &state.settings.websocket;
    ws.max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, raw_group_id, auth, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(mut socket: WebSocket, raw_group_id: String, auth: AuthUser, state: AppState) {
    let Some(group_id) = parse_group_id(&raw_group_id) else {
        tracing::warn!(
            user_id = auth.user_id,
            group_id = %raw_group_id,
            "Rejecting chat connection without a valid groupId"
        );
        let _ = socket.send(missing_group_close()).await;
        return;
    };

    let (handle, mut rx) = ConnectionHandle::channel();
    let registration = match state.gateway.open(group_id, handle) {
        Ok(registration) => registration,
        Err(e) => {
            tracing::warn!(user_id = auth.user_id, error = %e, "Rejecting chat connection");
            let _ = socket.send(group_full_close()).await;
            return;
        }
    };

    tracing::info!(
        user_id = auth.user_id,
        group_id = group_id,
        connection_id = %registration.connection_id(),
        "Chat connection opened"
    );

    // Split socket for concurrent read/write
    let (mut sender, receiver) = socket.split();

    // Forward queued broadcasts to the socket
    let sender_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.as_ref().into())).await.is_err() {
                break;
            }
        }
    });

    state.gateway.run(registration, receiver).await;

    sender_task.abort();
}
