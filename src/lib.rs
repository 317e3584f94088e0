//! # Packet Server Library
//!
//! Backend for the Packet shared shopping-list application. This crate hosts
//! the real-time group chat subsystem:
//! - WebSocket gateway with per-group fan-out
//! - RESTful endpoints for chat history, participants and deletion
//! - PostgreSQL (or in-memory) message persistence
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Chat entities and collaborator traits
//! - **Application Layer**: Chat service and wire DTOs
//! - **Infrastructure Layer**: Database, in-memory stores and metrics
//! - **Presentation Layer**: HTTP handlers and WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! packet_server/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities and collaborator traits
//! +-- application/    Chat service and DTOs
//! +-- infrastructure/ Database, in-memory stores, metrics
//! +-- presentation/   HTTP routes, middleware and WebSocket gateway
//! +-- shared/         Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
