use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::domain::ports::AssignmentClient;
use crate::use_cases::matchmaker::Matchmaker;

// Shared application state for the HTTP handlers and the pairing loop.
// One rw-lock guards all authoritative tables plus the vector clock.
pub struct AppState {
    pub matchmaker: Arc<RwLock<Matchmaker>>,
    pub assignments: Arc<dyn AssignmentClient>,
    pub match_tick: Duration,
    pub heartbeat_timeout: Duration,
}
