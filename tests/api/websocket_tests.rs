//! Chat WebSocket Tests
//!
//! Drive the real upgrade handler over TCP.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Instant};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::common::{test_settings, TestApp};

type ClientSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr, path: &str, token: &str) -> ClientSocket {
    let mut request = format!("ws://{addr}{path}")
        .into_client_request()
        .expect("request should build");
    request.headers_mut().insert(
        AUTHORIZATION,
        format!("Bearer {token}").parse().expect("header should parse"),
    );
    let (socket, _) = connect_async(request).await.expect("client should connect");
    socket
}

async fn next_message(socket: &mut ClientSocket) -> WsMessage {
    loop {
        let next = timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("timed out waiting for websocket frame");
        let message = next
            .expect("websocket should remain open")
            .expect("websocket read should succeed");
        match message {
            WsMessage::Ping(_) | WsMessage::Pong(_) => continue,
            other => return other,
        }
    }
}

async fn expect_close(socket: &mut ClientSocket) -> (u16, String) {
    match next_message(socket).await {
        WsMessage::Close(Some(frame)) => (u16::from(frame.code), frame.reason.as_str().to_owned()),
        other => panic!("expected close frame, got {other:?}"),
    }
}

async fn wait_for_connections(app: &TestApp, group_id: i64, expected: usize) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while app.state.gateway.registry().connection_count(group_id) != expected {
        assert!(
            Instant::now() < deadline,
            "group {group_id} never reached {expected} connections"
        );
        sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_message_reaches_both_clients() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let mut alice = connect(addr, "/chat/42", &app.token).await;
    let mut bob = connect(addr, "/chat/42", &app.token).await;
    wait_for_connections(&app, 42, 2).await;

    let frame = json!({
        "token": "t1",
        "groupId": 42,
        "senderId": 7,
        "text": "hi",
        "timestamp": "2024-01-01T00:00:00Z",
        "replyToToken": null
    });
    alice
        .send(WsMessage::Text(frame.to_string().into()))
        .await
        .expect("client should send frame");

    for socket in [&mut alice, &mut bob] {
        match next_message(socket).await {
            WsMessage::Text(body) => {
                let value: serde_json::Value = serde_json::from_str(body.as_str()).unwrap();
                assert_eq!(value, frame);
            }
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    // Closing one client removes only that connection.
    alice.close(None).await.expect("client should close");
    wait_for_connections(&app, 42, 1).await;
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn test_non_numeric_group_is_closed_with_1003() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let mut socket = connect(addr, "/chat/abc", &app.token).await;

    assert_eq!(
        expect_close(&mut socket).await,
        (1003, "Missing groupId".to_string())
    );
    assert_eq!(app.state.gateway.registry().group_count(), 0);
}

#[tokio::test]
async fn test_full_group_is_closed_with_1013() {
    let mut settings = test_settings();
    settings.chat.max_connections_per_group = Some(1);
    let app = TestApp::with_settings(settings);
    let addr = app.spawn().await;

    let _first = connect(addr, "/chat/42", &app.token).await;
    wait_for_connections(&app, 42, 1).await;

    let mut second = connect(addr, "/chat/42", &app.token).await;
    let (code, _reason) = expect_close(&mut second).await;

    assert_eq!(code, 1013);
    assert_eq!(app.state.gateway.registry().connection_count(42), 1);
}
