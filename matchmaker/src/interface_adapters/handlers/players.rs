use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use shared::protocol::{
    ErrorResponse, PlayerInfoRequest, PlayerStatusRequest, PlayerStatusResponse,
    QueuePlayerResponse, QueueStatus, PLAYER_STATE_UNKNOWN,
};

use crate::interface_adapters::protocol::player_state_label;
use crate::interface_adapters::state::AppState;
use crate::use_cases::matchmaker::EnqueueOutcome;

// Enqueue a player. Business rejections are well-formed responses carrying
// the current clock, not transport errors.
#[tracing::instrument(name = "queue_player", skip_all, fields(player_id = %request.player_id))]
pub async fn queue_player(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlayerInfoRequest>,
) -> Result<Json<QueuePlayerResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.player_id.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                message: "player_id is required".to_string(),
            }),
        ));
    }

    let (outcome, clock) = {
        let mut matchmaker = state.matchmaker.write().await;
        let outcome = matchmaker.queue_player(&request);
        (outcome, matchmaker.clock().clone())
    };

    let (status, message) = match outcome {
        EnqueueOutcome::Queued => (QueueStatus::Ok, "queued for matchmaking"),
        EnqueueOutcome::AlreadyInQueue => (QueueStatus::AlreadyInQueue, "already waiting in queue"),
        EnqueueOutcome::InMatch => (QueueStatus::InMatch, "currently in a match"),
    };

    Ok(Json(QueuePlayerResponse {
        status,
        message: message.to_string(),
        clock,
    }))
}

// Report a player's state. Takes the write lock because the request clock
// still merges into the global clock; the self component is not bumped.
#[tracing::instrument(name = "player_status", skip_all, fields(player_id = %request.player_id))]
pub async fn player_status(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlayerStatusRequest>,
) -> Result<Json<PlayerStatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.player_id.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                message: "player_id is required".to_string(),
            }),
        ));
    }

    let mut matchmaker = state.matchmaker.write().await;
    let view = matchmaker.player_status(&request);
    let clock = matchmaker.clock().clone();

    let response = match view {
        None => PlayerStatusResponse {
            state: PLAYER_STATE_UNKNOWN.to_string(),
            match_id: String::new(),
            server_addr: String::new(),
            clock,
        },
        Some(view) => PlayerStatusResponse {
            state: player_state_label(view.phase).to_string(),
            match_id: view.match_id.unwrap_or_default(),
            server_addr: view.server_addr.unwrap_or_default(),
            clock,
        },
    };

    Ok(Json(response))
}
