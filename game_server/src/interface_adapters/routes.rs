use std::sync::Arc;

use axum::{routing::post, Router};

use super::handlers::assign_match;
use super::state::AppState;

// Build the HTTP router for the game server surface.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/matches/assign", post(assign_match))
        .with_state(state)
}
