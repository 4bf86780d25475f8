pub mod clients;
pub mod config;
pub mod error;
pub mod move_service;
pub mod routes;
pub mod sessions;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};

use arena_core::move_source::MoveService;

use crate::config::Config;
use crate::sessions::SessionRegistry;

/// Build the application router around a move service.
pub fn build_router(config: &Config, service: Arc<dyn MoveService>) -> Router {
    let registry = Arc::new(SessionRegistry::new(
        Arc::clone(&service),
        Duration::from_millis(config.ai_move_delay_ms),
    ));

    Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Catalog and stateless move endpoint
        .route("/api/players", get(routes::players::list_players))
        .route("/api/chess/move", post(routes::chess::get_move))
        // Match sessions
        .route("/api/matches", post(routes::matches::create_match))
        .route(
            "/api/matches/{id}",
            get(routes::matches::get_match).delete(routes::matches::delete_match),
        )
        .route("/api/matches/{id}/players", put(routes::matches::assign_players))
        .route("/api/matches/{id}/config", put(routes::matches::update_config))
        .route("/api/matches/{id}/start", post(routes::matches::start))
        .route("/api/matches/{id}/pause", post(routes::matches::pause))
        .route("/api/matches/{id}/resume", post(routes::matches::resume))
        .route("/api/matches/{id}/resign", post(routes::matches::resign))
        .route("/api/matches/{id}/move", post(routes::matches::human_move))
        .route("/api/matches/{id}/draw/offer", post(routes::matches::offer_draw))
        .route("/api/matches/{id}/draw/accept", post(routes::matches::accept_draw))
        .route("/api/matches/{id}/draw/reject", post(routes::matches::reject_draw))
        .route("/api/matches/{id}/pgn", get(routes::matches::export_pgn))
        // Shared state
        .layer(Extension(registry))
        .layer(Extension(service))
}
