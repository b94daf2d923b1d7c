use std::sync::Arc;

use axum::{extract::State, Json};

use shared::protocol::{AssignMatchRequest, AssignMatchResponse, AssignStatus, ServerStatusUpdate};

use crate::domain::AcceptOutcome;
use crate::use_cases::simulation;

use super::state::AppState;

// Assignment RPC invoked by the matchmaker. Refusals are well-formed Busy
// responses; acceptance starts the simulation off the RPC path.
#[tracing::instrument(name = "assign_match", skip_all, fields(match_id = %request.match_id))]
pub async fn assign_match(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AssignMatchRequest>,
) -> Json<AssignMatchResponse> {
    state.clock.observe(&request.clock);

    let outcome = {
        let mut session = state.session.lock().await;
        session.try_accept(&request.match_id)
    };

    match outcome {
        AcceptOutcome::Refused => {
            tracing::warn!("assignment refused, a match is already running");
            Json(AssignMatchResponse {
                status: AssignStatus::Busy,
                message: "game server is busy".to_string(),
                clock: state.clock.tick_snapshot(),
            })
        }
        AcceptOutcome::Accepted => {
            tracing::info!(player_ids = ?request.player_ids, "match accepted");

            // Push the busy transition right away, then run the match.
            let task_state = Arc::clone(&state);
            let match_id = request.match_id.clone();
            tokio::spawn(async move {
                if let Err(error) = task_state
                    .matchmaker
                    .report(ServerStatusUpdate::Busy, &match_id)
                    .await
                {
                    tracing::warn!(%error, "could not report busy status");
                }
                simulation::simulate_match(task_state, match_id).await;
            });

            Json(AssignMatchResponse {
                status: AssignStatus::Ok,
                message: "match accepted".to_string(),
                clock: state.clock.tick_snapshot(),
            })
        }
    }
}
