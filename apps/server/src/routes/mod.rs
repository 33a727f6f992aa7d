//! HTTP routes.

pub mod categories;
pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod pos;
pub mod products;
pub mod session;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::state::AppState;

/// Every endpoint, unlayered.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health-check", get(health::health_check))
        .route("/login", post(session::login))
        .route("/pos", get(pos::search).post(pos::checkout))
        .route("/inventory", get(inventory::overview))
        .route("/inventory/{product}", patch(inventory::adjust))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/products", get(products::list).post(products::create))
        .route("/products/{id}", get(products::show).put(products::update))
        .route("/categories", get(categories::list).post(categories::create))
}
