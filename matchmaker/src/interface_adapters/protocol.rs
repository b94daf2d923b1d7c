// Mapping between internal state enums and their wire rendering. The two
// sides stay disjoint so protocol changes cannot leak into core logic.

use shared::protocol::{
    self, PlayerQueueEntry, ServerHealth, ServerInfo, SystemStatusResponse,
};

use crate::domain::entities::{PlayerPhase, ServerPhase};
use crate::use_cases::matchmaker::SystemSnapshot;

pub fn player_state_label(phase: PlayerPhase) -> &'static str {
    match phase {
        PlayerPhase::Idle => protocol::PLAYER_STATE_IDLE,
        PlayerPhase::InQueue => protocol::PLAYER_STATE_IN_QUEUE,
        PlayerPhase::InMatch => protocol::PLAYER_STATE_IN_MATCH,
    }
}

pub fn server_health(phase: ServerPhase) -> ServerHealth {
    match phase {
        ServerPhase::Unknown => ServerHealth::Unknown,
        ServerPhase::Available => ServerHealth::Available,
        ServerPhase::Busy => ServerHealth::Busy,
        ServerPhase::Down => ServerHealth::Down,
    }
}

pub fn system_status_response(snapshot: SystemSnapshot) -> SystemStatusResponse {
    let servers = snapshot
        .servers
        .into_iter()
        .map(|server| ServerInfo {
            server_id: server.server_id,
            status: server_health(server.phase),
            address: server.address,
            current_match_id: server.current_match.unwrap_or_default(),
            last_heartbeat: (server.last_heartbeat_ms / 1000) as i64,
        })
        .collect();
    let queue = snapshot
        .queue
        .into_iter()
        .map(|entry| PlayerQueueEntry {
            player_id: entry.player_id,
            seconds_in_queue: entry.waited_ms / 1000,
        })
        .collect();
    SystemStatusResponse {
        servers,
        queue,
        clock: snapshot.clock,
    }
}
