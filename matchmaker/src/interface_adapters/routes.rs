use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interface_adapters::handlers::{admin, players, servers};
use crate::interface_adapters::state::AppState;

// Build the HTTP router for the matchmaking RPC surface.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/matchmaking/queue", post(players::queue_player))
        .route("/matchmaking/status", post(players::player_status))
        .route("/servers/status", post(servers::update_server_status))
        .route("/admin/system-status", get(admin::system_status))
        .route("/admin/servers/state", post(admin::force_server_state))
        .with_state(state)
}
