use rand::Rng;

// Player lifecycle as tracked by the coordinator. Wire rendering of these
// states lives in the interface adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    Idle,
    InQueue,
    InMatch,
}

#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub id: String,
    pub phase: PlayerPhase,
    pub match_id: Option<String>,
    // Epoch millis of the last state-changing operation for this player.
    pub last_op_ms: u64,
}

impl PlayerRecord {
    pub fn new(id: String) -> Self {
        Self {
            id,
            phase: PlayerPhase::Idle,
            match_id: None,
            last_op_ms: 0,
        }
    }
}

// Registered game server health. Unknown covers a server we have heard of
// but whose real phase is unconfirmed (first contact, refused dispatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPhase {
    Unknown,
    Available,
    Busy,
    Down,
}

#[derive(Debug, Clone)]
pub struct ServerRecord {
    pub id: String,
    pub address: String,
    pub phase: ServerPhase,
    pub current_match: Option<String>,
    pub last_heartbeat_ms: u64,
    // First registration time; pairing prefers the longest-registered server.
    pub registered_at_ms: u64,
}

impl ServerRecord {
    pub fn new(id: String, now_ms: u64) -> Self {
        Self {
            id,
            address: String::new(),
            phase: ServerPhase::Unknown,
            current_match: None,
            last_heartbeat_ms: now_ms,
            registered_at_ms: now_ms,
        }
    }
}

// A formed match binds exactly one server and an ordered player pair.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub id: String,
    pub player_ids: [String; 2],
    pub server_id: String,
}

#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub player_id: String,
    pub enqueued_at_ms: u64,
}

// Opaque match identifier: "M" plus a random 32-bit hex token. Callers
// must re-roll on collision with a live match.
pub fn build_match_id() -> String {
    format!("M{:08x}", rand::thread_rng().gen::<u32>())
}
