//! # tally-server: HTTP API for Tally POS
//!
//! JSON over HTTP for the register, the inventory screens and the admin
//! dashboard.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request                                                                │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  TraceLayer (request span)                                              │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  Handler(State<AppState>, CurrentUser, body)                            │
//! │     ├── user.require(Capability::...)        → 403                      │
//! │     ├── tally_core::validation::*            → 422                      │
//! │     └── state.db.checkout() / inventory() / repositories                │
//! │                                                                         │
//! │  Err(ApiError) → { success: false, code, message }                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod views;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    routes::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
