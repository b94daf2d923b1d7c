use std::{env, time::Duration};

// Runtime/server constants (not matchmaking policy).

// Node id stamped into the vector clock for every local mutation.
pub const SELF_NODE_ID: &str = "Matchmaker";

pub fn http_port() -> u16 {
    env::var("MATCHMAKER_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(50051)
}

// Pairing/sweep period.
pub fn match_tick() -> Duration {
    let millis = env::var("MATCH_TICK_MS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(2_000);
    Duration::from_millis(millis)
}

// Server liveness deadline.
pub fn heartbeat_timeout() -> Duration {
    let secs = env::var("HEARTBEAT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(30);
    Duration::from_secs(secs)
}

// Deadline for one outbound assignment RPC.
pub fn dispatch_timeout() -> Duration {
    let secs = env::var("DISPATCH_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(10);
    Duration::from_secs(secs)
}
