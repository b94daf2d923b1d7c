use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use shared::protocol::{
    AdminServerUpdateRequest, AdminUpdateResponse, AdminUpdateStatus, ErrorResponse,
    SystemStatusResponse,
};

use crate::interface_adapters::protocol::system_status_response;
use crate::interface_adapters::state::AppState;
use crate::use_cases::matchmaker::ForceOutcome;

// Consistent snapshot of servers and queue, taken under the read lock.
#[tracing::instrument(name = "system_status", skip_all)]
pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatusResponse> {
    let snapshot = {
        let matchmaker = state.matchmaker.read().await;
        matchmaker.system_status()
    };
    Json(system_status_response(snapshot))
}

// Force a server Available or Down from the admin surface.
#[tracing::instrument(
    name = "force_server_state",
    skip_all,
    fields(server_id = %request.server_id, forced_status = ?request.forced_status)
)]
pub async fn force_server_state(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AdminServerUpdateRequest>,
) -> Result<Json<AdminUpdateResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.server_id.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                message: "server_id is required".to_string(),
            }),
        ));
    }

    let (outcome, clock) = {
        let mut matchmaker = state.matchmaker.write().await;
        let outcome = matchmaker.force_server_state(&request);
        (outcome, matchmaker.clock().clone())
    };

    let (status, message) = match outcome {
        ForceOutcome::Applied => (AdminUpdateStatus::Ok, "server state updated"),
        ForceOutcome::NotFound => (AdminUpdateStatus::NotFound, "server is not registered"),
        ForceOutcome::Conflict => (
            AdminUpdateStatus::Conflict,
            "cannot force a busy server available",
        ),
    };

    Ok(Json(AdminUpdateResponse {
        status,
        message: message.to_string(),
        clock,
    }))
}
