//! Occurrence API server for the SISOCC operations desk.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** for reporting, listing, updating, and deleting
//!   occurrences, plus aggregate stats and a health check
//! - **`WebSocket` endpoint** (`/ws/occurrences`) streaming lifecycle
//!   events via [`tokio::sync::broadcast`]
//! - **Multipart photo upload** on the creation endpoint
//!
//! # Architecture
//!
//! Handlers validate and convert requests at the boundary
//! ([`validate`]), then hand typed input to the lifecycle engine in
//! `sisocc-core`. Reads go straight to the stores in `sisocc-db`. The
//! acting user arrives in the `x-user-id` header ([`auth`]); every
//! successful write appends an audit entry.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod upload;
pub mod validate;
pub mod ws;

// Re-export primary types for convenience.
pub use config::{ConfigError, ServiceConfig};
pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
