//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - In-memory stores for local runs and tests
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod repositories;
