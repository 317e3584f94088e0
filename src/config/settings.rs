//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Storage backend selection
    pub storage: StorageSettings,

    /// JWT verification settings
    pub jwt: JwtSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// WebSocket configuration
    pub websocket: WebSocketSettings,

    /// Group chat configuration
    #[serde(default)]
    pub chat: ChatSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL (required for the postgres backend)
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

/// Which implementation backs the chat collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL through sqlx
    Postgres,
    /// Process-local maps, lost on restart
    Memory,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
}

/// JWT verification configuration.
///
/// Tokens are issued by the account service; this server only verifies them.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Shared HMAC secret
    pub secret: String,

    /// Expected `iss` claim
    pub issuer: String,

    /// Expected `aud` claim
    pub audience: String,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// WebSocket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketSettings {
    /// Maximum message size in bytes (default: 64KB)
    pub max_message_size: usize,

    /// Maximum frame size in bytes (default: 16KB)
    pub max_frame_size: usize,
}

/// Group chat configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatSettings {
    /// Per-group connection cap. Unset means unlimited.
    #[serde(default)]
    pub max_connections_per_group: Option<usize>,
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// if the JWT secret is too short, or if the postgres backend is
    /// selected without a database URL.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("storage.backend", "postgres")?
            .set_default("jwt.issuer", "http://localhost:8080/")?
            .set_default("jwt.audience", "http://localhost:8080/")?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("websocket.max_message_size", 65536_i64)? // 64KB
            .set_default("websocket.max_frame_size", 16384_i64)? // 16KB
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=8080 -> server.port = 8080
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| settings.validate())
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "JWT secret must be at least {} characters for security. Current length: {}",
                MIN_JWT_SECRET_LENGTH,
                self.jwt.secret.len()
            )));
        }

        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_empty() {
            return Err(ConfigError::Message(
                "database.url (or DATABASE_URL) is required for the postgres storage backend"
                    .into(),
            ));
        }

        if self.chat.max_connections_per_group == Some(0) {
            return Err(ConfigError::Message(
                "chat.max_connections_per_group must be positive when set".into(),
            ));
        }

        Ok(self)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(backend: StorageBackend, secret: &str, url: &str) -> Settings {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".into(),
                port: 8080,
            },
            database: DatabaseSettings {
                url: url.into(),
                max_connections: 10,
                min_connections: 2,
                acquire_timeout: 30,
                run_migrations: false,
            },
            storage: StorageSettings { backend },
            jwt: JwtSettings {
                secret: secret.into(),
                issuer: "http://localhost:8080/".into(),
                audience: "http://localhost:8080/".into(),
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

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_short_secret_rejected() {
        let result = settings(StorageBackend::Memory, "short", "").validate();
        assert!(result.is_err());
    }

    #[test]
    fn test_postgres_requires_url() {
        assert!(settings(StorageBackend::Postgres, SECRET, "").validate().is_err());
        assert!(settings(StorageBackend::Postgres, SECRET, "postgres://localhost/packet")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_memory_backend_without_url() {
        assert!(settings(StorageBackend::Memory, SECRET, "").validate().is_ok());
    }

    #[test]
    fn test_zero_connection_cap_rejected() {
        let mut s = settings(StorageBackend::Memory, SECRET, "");
        s.chat.max_connections_per_group = Some(0);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_server_addr() {
        let s = settings(StorageBackend::Memory, SECRET, "");
        assert_eq!(s.server_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_load_with_secret_and_database_url_only() {
        std::env::set_var("JWT_SECRET", SECRET);
        std::env::set_var("DATABASE_URL", "postgres://localhost/packet");

        let loaded = Settings::load().expect("settings should load from env");

        assert_eq!(loaded.jwt.secret, SECRET);
        assert_eq!(loaded.database.url, "postgres://localhost/packet");
        assert_eq!(loaded.storage.backend, StorageBackend::Postgres);
        assert_eq!(loaded.chat.max_connections_per_group, None);
    }
}
