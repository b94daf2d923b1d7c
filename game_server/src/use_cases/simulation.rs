// Simulated match execution: sleep through the match, maybe crash, and
// report the transition back to the matchmaker.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use shared::protocol::ServerStatusUpdate;

use crate::interface_adapters::state::AppState;

pub async fn simulate_match(state: Arc<AppState>, match_id: String) {
    let duration = {
        let mut rng = rand::thread_rng();
        Duration::from_secs(rng.gen_range(state.match_duration_secs.clone()))
    };
    tracing::info!(%match_id, ?duration, "simulating match");
    tokio::time::sleep(duration).await;

    // Post-match crash roll, used to exercise failure detection.
    let crashed = rand::thread_rng().gen::<f64>() < state.crash_probability;
    if crashed {
        tracing::warn!(%match_id, "simulating crash after match");
        let _ = state.matchmaker.report(ServerStatusUpdate::Down, "").await;
        std::process::exit(1);
    }

    {
        let mut session = state.session.lock().await;
        session.complete();
    }

    // Reporting Available with no match id closes the match upstream.
    match state.matchmaker.report(ServerStatusUpdate::Available, "").await {
        Ok(()) => tracing::info!(%match_id, "match finished, available again"),
        Err(error) => tracing::error!(%match_id, %error, "failed to report available"),
    }
}
