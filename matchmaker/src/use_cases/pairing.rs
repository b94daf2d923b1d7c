// Periodic pairing-and-liveness task plus the outbound dispatch path.

use std::sync::Arc;

use tokio::sync::watch;

use shared::protocol::{AssignMatchRequest, AssignStatus};

use crate::interface_adapters::state::AppState;
use crate::use_cases::matchmaker::DispatchJob;

/// Long-running loop: one pairing pass and one heartbeat sweep per tick.
/// Exits as soon as the shutdown flag flips.
pub async fn run_pairing_loop(state: Arc<AppState>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(state.match_tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => run_tick(&state).await,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::info!("pairing loop stopped");
                    return;
                }
            }
        }
    }
}

async fn run_tick(state: &Arc<AppState>) {
    // Commit pairings and the sweep under one write-lock acquisition, then
    // release before any network traffic.
    let jobs = {
        let mut matchmaker = state.matchmaker.write().await;
        let jobs = matchmaker.form_matches();
        matchmaker.sweep_heartbeats(state.heartbeat_timeout.as_millis() as u64);
        jobs
    };

    for job in jobs {
        let state = Arc::clone(state);
        tokio::spawn(async move {
            dispatch_assignment(state, job).await;
        });
    }
}

/// Push one assignment to its game server and settle the result. The lock
/// is only re-taken once the remote call has finished, so slow servers
/// never stall inbound handlers.
pub async fn dispatch_assignment(state: Arc<AppState>, job: DispatchJob) {
    let request = AssignMatchRequest {
        match_id: job.match_id.clone(),
        player_ids: job.player_ids.to_vec(),
        clock: job.clock.clone(),
    };

    match state.assignments.assign_match(&job.address, &request).await {
        Ok(response) => {
            let mut matchmaker = state.matchmaker.write().await;
            matchmaker.observe_remote_clock(&response.clock);
            match response.status {
                AssignStatus::Ok => {
                    tracing::info!(
                        match_id = %job.match_id,
                        server_id = %job.server_id,
                        "assignment accepted"
                    );
                }
                // The server answered but will not take the match; it stays
                // up and the pair goes back to the queue head.
                AssignStatus::Busy | AssignStatus::Reject => {
                    matchmaker.recover_assignment(&job, false);
                }
            }
        }
        Err(error) => {
            tracing::error!(
                match_id = %job.match_id,
                server_id = %job.server_id,
                %error,
                "assignment dispatch failed"
            );
            let mut matchmaker = state.matchmaker.write().await;
            matchmaker.recover_assignment(&job, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::sync::RwLock;

    use shared::protocol::{PlayerInfoRequest, ServerStatusUpdate, ServerStatusUpdateRequest};
    use shared::VectorClock;

    use crate::domain::entities::{PlayerPhase, ServerPhase};
    use crate::use_cases::matchmaker::Matchmaker;
    use crate::use_cases::test_support::{advancing_time, ScriptedAssignments};

    fn app_state(assignments: Arc<ScriptedAssignments>) -> Arc<AppState> {
        let (time, _handle) = advancing_time(1_000);
        Arc::new(AppState {
            matchmaker: Arc::new(RwLock::new(Matchmaker::new("Matchmaker", time))),
            assignments,
            match_tick: Duration::from_millis(50),
            heartbeat_timeout: Duration::from_secs(30),
        })
    }

    async fn pair_two_players(state: &Arc<AppState>) -> super::DispatchJob {
        let mut matchmaker = state.matchmaker.write().await;
        matchmaker.update_server_status(&ServerStatusUpdateRequest {
            server_id: "G1".to_string(),
            new_status: ServerStatusUpdate::Available,
            address: "127.0.0.1:60051".to_string(),
            match_id: String::new(),
            clock: VectorClock::new(),
        });
        for player_id in ["PlayerA", "PlayerB"] {
            matchmaker.queue_player(&PlayerInfoRequest {
                player_id: player_id.to_string(),
                game_mode: "1v1".to_string(),
                clock: VectorClock::new(),
            });
        }
        let mut jobs = matchmaker.form_matches();
        assert_eq!(jobs.len(), 1);
        jobs.remove(0)
    }

    #[tokio::test]
    async fn when_dispatch_succeeds_then_players_stay_in_match() {
        let assignments = Arc::new(ScriptedAssignments::new());
        assignments.push_ok();
        let state = app_state(Arc::clone(&assignments));
        let job = pair_two_players(&state).await;

        dispatch_assignment(Arc::clone(&state), job.clone()).await;

        let matchmaker = state.matchmaker.read().await;
        let calls = assignments.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "127.0.0.1:60051");
        assert_eq!(calls[0].1.match_id, job.match_id);
        assert_eq!(calls[0].1.player_ids, vec!["PlayerA", "PlayerB"]);
        assert!(!calls[0].1.clock.is_empty());
        assert_eq!(matchmaker.system_status().queue.len(), 0);
    }

    #[tokio::test]
    async fn when_dispatch_is_unreachable_then_server_downs_and_pair_requeues() {
        let assignments = Arc::new(ScriptedAssignments::new());
        assignments.push_unreachable();
        let state = app_state(Arc::clone(&assignments));
        let job = pair_two_players(&state).await;

        dispatch_assignment(Arc::clone(&state), job.clone()).await;

        let matchmaker = state.matchmaker.read().await;
        let snapshot = matchmaker.system_status();
        assert_eq!(snapshot.servers[0].phase, ServerPhase::Down);
        let order: Vec<&str> = snapshot
            .queue
            .iter()
            .map(|entry| entry.player_id.as_str())
            .collect();
        assert_eq!(order, ["PlayerA", "PlayerB"]);
    }

    #[tokio::test]
    async fn when_dispatch_is_refused_then_server_stays_up() {
        let assignments = Arc::new(ScriptedAssignments::new());
        assignments.push_busy();
        let state = app_state(Arc::clone(&assignments));
        let job = pair_two_players(&state).await;

        dispatch_assignment(Arc::clone(&state), job.clone()).await;

        let mut matchmaker = state.matchmaker.write().await;
        let snapshot = matchmaker.system_status();
        assert_eq!(snapshot.servers[0].phase, ServerPhase::Unknown);
        assert_eq!(snapshot.queue.len(), 2);
        let view = matchmaker
            .player_status(&shared::protocol::PlayerStatusRequest {
                player_id: "PlayerA".to_string(),
                clock: VectorClock::new(),
            })
            .expect("known player");
        assert_eq!(view.phase, PlayerPhase::InQueue);
    }
}
