//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::Request,
    response::Response,
    Router,
};
use chrono::{TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use tokio::net::TcpListener;
use tower::ServiceExt;

use packet_server::config::{
    ChatSettings, CorsSettings, DatabaseSettings, JwtSettings, ServerSettings, Settings,
    StorageBackend, StorageSettings, WebSocketSettings,
};
use packet_server::domain::{ChatMessage, MessageStore, User};
use packet_server::infrastructure::repositories::{
    InMemoryGroupMembership, InMemoryMessageStore, InMemoryUserRepository,
};
use packet_server::presentation::middleware::Claims;
use packet_server::startup::{build_router, AppState};

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const JWT_ISSUER: &str = "http://localhost:8080/";

/// Settings for the in-memory backend
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            url: String::new(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout: 1,
            run_migrations: false,
        },
        storage: StorageSettings {
            backend: StorageBackend::Memory,
        },
        jwt: JwtSettings {
            secret: JWT_SECRET.into(),
            issuer: JWT_ISSUER.into(),
            audience: JWT_ISSUER.into(),
        },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        websocket: WebSocketSettings {
            max_message_size: 65536,
            max_frame_size: 16384,
        },
        chat: ChatSettings {
            max_connections_per_group: None,
        },
        environment: "test".into(),
    }
}

/// Signed token for `user_id`, valid for an hour
pub fn token_for(user_id: i64) -> String {
    let claims = Claims {
        user_id,
        exp: Utc::now().timestamp() + 3600,
        iss: JWT_ISSUER.into(),
        aud: JWT_ISSUER.into(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to sign test token")
}

/// Test application over in-memory stores
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<InMemoryMessageStore>,
    pub groups: Arc<InMemoryGroupMembership>,
    pub users: Arc<InMemoryUserRepository>,
    pub token: String,
}

impl TestApp {
    /// Create a new test application with empty stores
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    /// Create a test application with custom settings
    pub fn with_settings(settings: Settings) -> Self {
        let store = Arc::new(InMemoryMessageStore::new());
        let groups = Arc::new(InMemoryGroupMembership::new());
        let users = Arc::new(InMemoryUserRepository::new());

        let state = AppState::new(
            settings,
            store.clone(),
            groups.clone(),
            users.clone(),
            None,
        );

        Self {
            router: build_router(state.clone()),
            state,
            store,
            groups,
            users,
            token: token_for(1),
        }
    }

    /// Serve the router on an ephemeral local port
    pub async fn spawn(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("test listener should bind");
        let addr = listener
            .local_addr()
            .expect("listener should expose local address");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("test server should run");
        });
        addr
    }

    /// Add a user and make them a member of `group_id`
    pub fn add_member(&self, group_id: i64, user_id: i64) {
        self.users.insert(User {
            id: user_id,
            name: format!("user{}", user_id),
            email: format!("user{}@example.com", user_id),
            role: "member".into(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        });
        self.groups.add_member(group_id, user_id);
    }

    /// Put a message straight into the store
    pub async fn seed_message(&self, token: &str, group_id: i64, minute: u32) -> ChatMessage {
        let message = ChatMessage {
            token: token.into(),
            group_id,
            sender_id: 1,
            text: format!("message {}", token),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap(),
            reply_to_token: None,
        };
        self.store
            .insert(&message)
            .await
            .expect("Failed to seed message")
    }

    async fn send(&self, method: &str, uri: &str, token: Option<&str>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        self.router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> Response {
        self.send("GET", uri, None).await
    }

    /// Make an authenticated GET request
    pub async fn get_auth(&self, uri: &str) -> Response {
        self.send("GET", uri, Some(&self.token)).await
    }

    /// Make an authenticated DELETE request
    pub async fn delete_auth(&self, uri: &str) -> Response {
        self.send("DELETE", uri, Some(&self.token)).await
    }

    /// Make a request with an arbitrary bearer token
    pub async fn get_with_token(&self, uri: &str, token: &str) -> Response {
        self.send("GET", uri, Some(token)).await
    }
}

/// Read a response body as JSON
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body as text
pub async fn text_body(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
