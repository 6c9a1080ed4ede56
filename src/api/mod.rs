use crate::state::SharedState;
use axum::Router;
use axum::routing::{get, post, put};

pub mod handlers;
pub mod responses;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::get_health))
        .route("/api/queue", get(handlers::get_queue))
        .route("/api/entries", post(handlers::create_entry))
        .route("/api/entries/{id}", get(handlers::get_entry))
        .route("/api/entries/{id}/estimate", post(handlers::recalculate_entry))
        .route(
            "/api/entries/{id}/actions/{action}",
            post(handlers::apply_action),
        )
        .route("/api/entries/{id}/table", put(handlers::assign_table))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .with_state(state)
}
