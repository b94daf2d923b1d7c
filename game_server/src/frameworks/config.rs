use std::ops::RangeInclusive;
use std::{env, time::Duration};

use rand::Rng;

// Runtime/server constants (not match policy).

pub fn http_port() -> u16 {
    env::var("GAME_SERVER_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(60051)
}

// Stable logical identity; random suffix when not configured.
pub fn server_id() -> String {
    env::var("SERVER_ID")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| format!("GameServer-{}", rand::thread_rng().gen_range(0..10_000)))
}

pub fn matchmaker_base_url() -> String {
    let addr = env::var("MATCHMAKER_ADDR").unwrap_or_else(|_| "localhost:50051".to_string());
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr
    } else {
        format!("http://{addr}")
    }
}

// Address the matchmaker should dial for assignments.
pub fn public_address(port: u16) -> String {
    env::var("GAME_SERVER_ADDR").unwrap_or_else(|_| format!("127.0.0.1:{port}"))
}

// Chance (0..1) of simulating a crash after a match.
pub fn crash_probability() -> f64 {
    env::var("CRASH_PROB")
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| (0.0..=1.0).contains(value))
        .unwrap_or(0.1)
}

pub const MATCH_DURATION_SECS: RangeInclusive<u64> = 10..=20;
pub const REPORT_TIMEOUT: Duration = Duration::from_secs(3);
// Status refresh period; must stay well under the matchmaker's
// heartbeat timeout.
pub const HEARTBEAT_PERIOD: Duration = Duration::from_secs(10);
