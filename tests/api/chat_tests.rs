//! Chat API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{json_body, TestApp};

#[tokio::test]
async fn test_chat_routes_require_token() {
    let app = TestApp::new();

    let response = app.get("/chat/42/messages").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/chat/42").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = TestApp::new();

    let response = app.get_with_token("/chat/42/messages", "garbage").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert_eq!(body["code"], 10003);
}

#[tokio::test]
async fn test_history_is_oldest_first() {
    let app = TestApp::new();
    app.seed_message("t2", 42, 5).await;
    app.seed_message("t1", 42, 1).await;
    app.seed_message("elsewhere", 7, 0).await;

    let response = app.get_auth("/chat/42/messages").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(
        body,
        json!([
            {
                "token": "t1",
                "groupId": 42,
                "senderId": 1,
                "text": "message t1",
                "timestamp": "2024-01-01T00:01:00Z",
                "replyToToken": null
            },
            {
                "token": "t2",
                "groupId": 42,
                "senderId": 1,
                "text": "message t2",
                "timestamp": "2024-01-01T00:05:00Z",
                "replyToToken": null
            }
        ])
    );
}

#[tokio::test]
async fn test_history_of_empty_group() {
    let app = TestApp::new();

    let response = app.get_auth("/chat/42/messages").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn test_history_rejects_bad_group_id() {
    let app = TestApp::new();

    let response = app.get_auth("/chat/abc/messages").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get_auth("/chat/0/messages").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = TestApp::new();
    app.seed_message("t1", 42, 0).await;

    let response = app.delete_auth("/chat/t1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "message": "Message deleted" }));
    assert!(app.store.is_empty());

    let response = app.delete_auth("/chat/t1").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_delete_blank_token_rejected() {
    let app = TestApp::new();

    let response = app.delete_auth("/chat/%20").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_group_users() {
    let app = TestApp::new();
    app.add_member(42, 2);
    app.add_member(42, 1);
    app.add_member(7, 3);

    let response = app.get_auth("/chat/42/users").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(body[0]["email"], "user1@example.com");
    assert_eq!(body[0]["createdAt"], "2024-01-01T00:00:00Z");
}

#[tokio::test]
async fn test_group_users_not_found() {
    let app = TestApp::new();

    let response = app.get_auth("/chat/42/users").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_group_42_scenario() {
    use futures::stream;
    use packet_server::presentation::websocket::ConnectionHandle;

    let app = TestApp::new();
    let gateway = app.state.gateway.clone();

    let (sender_handle, mut sender_rx) = ConnectionHandle::channel();
    let sender = gateway.open(42, sender_handle).unwrap();
    let (peer_handle, mut peer_rx) = ConnectionHandle::channel();
    let _peer = gateway.open(42, peer_handle).unwrap();

    let frame = json!({
        "token": "t1",
        "groupId": 42,
        "senderId": 7,
        "text": "hi",
        "timestamp": "2024-01-01T00:00:00Z",
        "replyToToken": null
    })
    .to_string();
    let inbound = stream::iter(vec![Ok::<_, axum::Error>(
        axum::extract::ws::Message::Text(frame.into()),
    )]);
    gateway.run(sender, inbound).await;

    let expected = json!({
        "token": "t1",
        "groupId": 42,
        "senderId": 7,
        "text": "hi",
        "timestamp": "2024-01-01T00:00:00Z",
        "replyToToken": null
    });
    for rx in [&mut sender_rx, &mut peer_rx] {
        let payload = rx.try_recv().unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value, expected);
    }

    let response = app.get_auth("/chat/42/messages").await;
    assert_eq!(json_body(response).await, json!([expected]));

    // The sender's session ended; only the peer remains.
    assert_eq!(gateway.registry().connection_count(42), 1);
}
