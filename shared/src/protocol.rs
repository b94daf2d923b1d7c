// Wire messages exchanged between the matchmaker, game servers and the
// player/admin clients. JSON over HTTP; enum values travel in snake_case.
// Every message carries a vector clock; a missing clock means "empty".

use serde::{Deserialize, Serialize};

use crate::clock::VectorClock;

// Player state as rendered on the wire. Internal state stays a closed
// enum on the matchmaker side; only this rendering crosses the boundary.
pub const PLAYER_STATE_IDLE: &str = "Idle";
pub const PLAYER_STATE_IN_QUEUE: &str = "InQueue";
pub const PLAYER_STATE_IN_MATCH: &str = "InMatch";
pub const PLAYER_STATE_UNKNOWN: &str = "Unknown";

// Request payload for enqueueing a player into matchmaking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfoRequest {
    pub player_id: String,
    #[serde(default)]
    pub game_mode: String,
    #[serde(default)]
    pub clock: VectorClock,
}

// Outcome status for the queue response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Ok,
    AlreadyInQueue,
    InMatch,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuePlayerResponse {
    pub status: QueueStatus,
    pub message: String,
    pub clock: VectorClock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStatusRequest {
    pub player_id: String,
    #[serde(default)]
    pub clock: VectorClock,
}

// State travels as a string ("Idle" | "InQueue" | "InMatch" | "Unknown");
// match_id and server_addr are empty unless the player is in a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStatusResponse {
    pub state: String,
    #[serde(default)]
    pub match_id: String,
    #[serde(default)]
    pub server_addr: String,
    pub clock: VectorClock,
}

// Status a game server reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerStatusUpdate {
    Available,
    Busy,
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStatusUpdateRequest {
    pub server_id: String,
    pub new_status: ServerStatusUpdate,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub match_id: String,
    #[serde(default)]
    pub clock: VectorClock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    Ok,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStatusUpdateResponse {
    pub status: UpdateStatus,
    pub clock: VectorClock,
}

// Assignment pushed from the matchmaker to a game server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignMatchRequest {
    pub match_id: String,
    pub player_ids: Vec<String>,
    #[serde(default)]
    pub clock: VectorClock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignStatus {
    Ok,
    Busy,
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignMatchResponse {
    pub status: AssignStatus,
    pub message: String,
    pub clock: VectorClock,
}

// Server health as shown in the admin snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerHealth {
    Unknown,
    Available,
    Busy,
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub server_id: String,
    pub status: ServerHealth,
    pub address: String,
    #[serde(default)]
    pub current_match_id: String,
    // Unix seconds of the last heartbeat received.
    pub last_heartbeat: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerQueueEntry {
    pub player_id: String,
    pub seconds_in_queue: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatusResponse {
    pub servers: Vec<ServerInfo>,
    pub queue: Vec<PlayerQueueEntry>,
    pub clock: VectorClock,
}

// Forced server states the admin surface recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedStatus {
    ForceAvailable,
    ForceDown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminServerUpdateRequest {
    pub server_id: String,
    pub forced_status: ForcedStatus,
    #[serde(default)]
    pub clock: VectorClock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminUpdateStatus {
    Ok,
    NotFound,
    Conflict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUpdateResponse {
    pub status: AdminUpdateStatus,
    pub message: String,
    pub clock: VectorClock,
}

// Simple error envelope for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_values_travel_in_snake_case() {
        let json = serde_json::to_string(&QueueStatus::AlreadyInQueue).expect("serialize");
        assert_eq!(json, "\"already_in_queue\"");

        let forced: ForcedStatus = serde_json::from_str("\"force_down\"").expect("deserialize");
        assert_eq!(forced, ForcedStatus::ForceDown);
    }

    #[test]
    fn requests_without_a_clock_decode_to_the_empty_clock() {
        let req: PlayerInfoRequest =
            serde_json::from_str(r#"{"player_id":"PlayerA","game_mode":"1v1"}"#)
                .expect("deserialize");
        assert!(req.clock.is_empty());

        let update: ServerStatusUpdateRequest =
            serde_json::from_str(r#"{"server_id":"G1","new_status":"available"}"#)
                .expect("deserialize");
        assert!(update.clock.is_empty());
        assert!(update.address.is_empty());
    }
}
