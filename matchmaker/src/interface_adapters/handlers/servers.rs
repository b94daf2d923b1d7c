use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use shared::protocol::{
    ErrorResponse, ServerStatusUpdateRequest, ServerStatusUpdateResponse, UpdateStatus,
};

use crate::interface_adapters::state::AppState;

// Inbound registration / heartbeat / transition push from a game server.
#[tracing::instrument(
    name = "update_server_status",
    skip_all,
    fields(server_id = %request.server_id, new_status = ?request.new_status)
)]
pub async fn update_server_status(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ServerStatusUpdateRequest>,
) -> Result<Json<ServerStatusUpdateResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.server_id.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                message: "server_id is required".to_string(),
            }),
        ));
    }

    let mut matchmaker = state.matchmaker.write().await;
    matchmaker.update_server_status(&request);
    let clock = matchmaker.clock().clone();

    Ok(Json(ServerStatusUpdateResponse {
        status: UpdateStatus::Ok,
        clock,
    }))
}
