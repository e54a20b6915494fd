//! HTTP API server
//!
//! This module provides the axum server exposing:
//! - `GET /contest/upcoming`: aggregated upcoming contests
//! - `GET /api/submissions/{platform}/{username}`: today's accepted submissions
//! - `GET /api/stats/{platform}/{username}`: lifetime solved counts
//! - `GET /health`, `GET /metrics`, `GET /`

pub mod api;
pub mod app;

pub use api::create_router;
pub use app::{shutdown_signal, ApiServer, AppState, ServerError, ServerInfo};
