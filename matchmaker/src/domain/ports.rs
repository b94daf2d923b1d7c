use std::fmt;

use async_trait::async_trait;

use shared::protocol::{AssignMatchRequest, AssignMatchResponse};

// Port for pushing match assignments to game servers.
#[async_trait]
pub trait AssignmentClient: Send + Sync {
    async fn assign_match(
        &self,
        address: &str,
        request: &AssignMatchRequest,
    ) -> Result<AssignMatchResponse, AssignmentError>;
}

// Failures on the dispatch path. Both variants count as "server lost":
// the caller marks the target Down and requeues the pair.
#[derive(Debug)]
pub enum AssignmentError {
    Transport(String),
    Decode(String),
}

impl fmt::Display for AssignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentError::Transport(detail) => write!(f, "dispatch transport error: {detail}"),
            AssignmentError::Decode(detail) => write!(f, "dispatch response decode error: {detail}"),
        }
    }
}

impl std::error::Error for AssignmentError {}

// Port for retrieving the current time.
pub trait TimeSource: Send + Sync {
    fn now_epoch_millis(&self) -> u64;
}
