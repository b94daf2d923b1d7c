use std::ops::RangeInclusive;
use std::sync::Arc;

use tokio::sync::Mutex;

use shared::NodeClock;

use crate::domain::MatchSession;
use crate::interface_adapters::clients::matchmaker::MatchmakerClient;

// Shared application state for the assignment endpoint and background tasks.
pub struct AppState {
    pub clock: Arc<NodeClock>,
    pub session: Arc<Mutex<MatchSession>>,
    pub matchmaker: Arc<MatchmakerClient>,
    pub crash_probability: f64,
    pub match_duration_secs: RangeInclusive<u64>,
}
