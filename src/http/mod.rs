//! HTTP API
//!
//! axum router exposing the dish catalog, meal log, daily stats and account
//! endpoints as JSON.

pub mod error;
pub mod handlers;
pub mod session;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::db::Database;
use crate::services::status::StatusTracker;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub status: Arc<StatusTracker>,
    pub session_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(database: Database, config: &ServerConfig) -> Self {
        Self {
            database,
            status: Arc::new(StatusTracker::new(config.database_path.clone())),
            session_ttl: config.session_ttl,
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/dishes",
            get(handlers::list_dishes).post(handlers::create_dish),
        )
        .route("/api/meals", post(handlers::log_meal))
        .route("/api/stats", get(handlers::daily_stats))
        .route("/api/status", get(handlers::status))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
