//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::application::services::{ChatService, ChatServiceImpl};
use crate::config::{Settings, StorageBackend};
use crate::domain::{GroupMembership, MessageStore, UserRepository};
use crate::infrastructure::database;
use crate::infrastructure::repositories::{
    InMemoryGroupMembership, InMemoryMessageStore, InMemoryUserRepository,
    PgChatMessageRepository, PgGroupMemberRepository, PgUserRepository,
};
use crate::presentation::http::{handlers, routes};
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::{ChatGateway, ConnectionRegistry};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Present only for the postgres storage backend
    pub db: Option<PgPool>,
    pub chat: Arc<dyn ChatService>,
    pub gateway: Arc<ChatGateway>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire the chat service, registry and gateway from storage collaborators.
    pub fn new<S, G, U>(
        settings: Settings,
        store: Arc<S>,
        groups: Arc<G>,
        users: Arc<U>,
        db: Option<PgPool>,
    ) -> Self
    where
        S: MessageStore + 'static,
        G: GroupMembership + 'static,
        U: UserRepository + 'static,
    {
        let chat: Arc<dyn ChatService> = Arc::new(ChatServiceImpl::new(store, groups, users));
        let registry = Arc::new(ConnectionRegistry::with_limit(
            settings.chat.max_connections_per_group,
        ));
        let gateway = Arc::new(ChatGateway::new(chat.clone(), registry));

        Self {
            db,
            chat,
            gateway,
            settings: Arc::new(settings),
        }
    }
}

/// Build the router with its outer middleware
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);
    routes::create_router(state)
        .layer(logging::create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        handlers::health::init_server_start();

        let state = match settings.storage.backend {
            StorageBackend::Postgres => {
                // Create database pool
                let db = database::create_pool(&settings.database).await?;
                tracing::info!("Database connection pool created");

                if settings.database.run_migrations {
                    database::run_migrations(&db).await?;
                    tracing::info!("Database migrations applied");
                }

                AppState::new(
                    settings.clone(),
                    Arc::new(PgChatMessageRepository::new(db.clone())),
                    Arc::new(PgGroupMemberRepository::new(db.clone())),
                    Arc::new(PgUserRepository::new(db.clone())),
                    Some(db),
                )
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; chat history is lost on restart");
                AppState::new(
                    settings.clone(),
                    Arc::new(InMemoryMessageStore::new()),
                    Arc::new(InMemoryGroupMembership::new()),
                    Arc::new(InMemoryUserRepository::new()),
                    None,
                )
            }
        };

        let router = build_router(state);

        // Bind to address
        let listener = TcpListener::bind(settings.server_addr()).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
