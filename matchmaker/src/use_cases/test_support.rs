// Shared test doubles for the matchmaking core and the dispatch path.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use shared::protocol::{AssignMatchRequest, AssignMatchResponse, AssignStatus};
use shared::VectorClock;

use crate::domain::ports::{AssignmentClient, AssignmentError, TimeSource};

// Manually driven time source: stands still until advanced.
#[derive(Clone)]
pub(crate) struct ManualTime(Arc<AtomicU64>);

impl ManualTime {
    pub(crate) fn advance(&self, millis: u64) {
        self.0.fetch_add(millis, Ordering::Relaxed);
    }
}

struct ManualTimeSource(Arc<AtomicU64>);

impl TimeSource for ManualTimeSource {
    fn now_epoch_millis(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

pub(crate) fn advancing_time(start_ms: u64) -> (Arc<dyn TimeSource>, ManualTime) {
    let cell = Arc::new(AtomicU64::new(start_ms));
    (
        Arc::new(ManualTimeSource(Arc::clone(&cell))),
        ManualTime(cell),
    )
}

// Assignment client fed from a script of replies; records every call.
pub(crate) struct ScriptedAssignments {
    replies: Mutex<VecDeque<Result<AssignMatchResponse, AssignmentError>>>,
    calls: Mutex<Vec<(String, AssignMatchRequest)>>,
}

impl ScriptedAssignments {
    pub(crate) fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn push_ok(&self) {
        self.push_reply(Ok(assign_response(AssignStatus::Ok)));
    }

    pub(crate) fn push_busy(&self) {
        self.push_reply(Ok(assign_response(AssignStatus::Busy)));
    }

    pub(crate) fn push_unreachable(&self) {
        self.push_reply(Err(AssignmentError::Transport(
            "connection refused".to_string(),
        )));
    }

    pub(crate) fn push_reply(&self, reply: Result<AssignMatchResponse, AssignmentError>) {
        self.replies
            .lock()
            .expect("replies mutex poisoned")
            .push_back(reply);
    }

    pub(crate) fn calls(&self) -> Vec<(String, AssignMatchRequest)> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

fn assign_response(status: AssignStatus) -> AssignMatchResponse {
    AssignMatchResponse {
        status,
        message: String::new(),
        clock: VectorClock::new(),
    }
}

#[async_trait]
impl AssignmentClient for ScriptedAssignments {
    async fn assign_match(
        &self,
        address: &str,
        request: &AssignMatchRequest,
    ) -> Result<AssignMatchResponse, AssignmentError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push((address.to_string(), request.clone()));
        self.replies
            .lock()
            .expect("replies mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(assign_response(AssignStatus::Ok)))
    }
}
