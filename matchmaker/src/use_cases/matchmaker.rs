use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use shared::clock::VectorClock;
use shared::protocol::{
    AdminServerUpdateRequest, ForcedStatus, PlayerInfoRequest, PlayerStatusRequest,
    ServerStatusUpdate, ServerStatusUpdateRequest,
};

use crate::domain::entities::{
    build_match_id, MatchRecord, PlayerPhase, PlayerRecord, QueueEntry, ServerPhase, ServerRecord,
};
use crate::domain::ports::TimeSource;

// Outcome of an enqueue attempt. Rejections still merge and advance the
// global clock; the handler reads the clock under the same lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    AlreadyInQueue,
    InMatch,
}

// Point-in-time view of one player, resolved through the match table.
#[derive(Debug, Clone)]
pub struct PlayerView {
    pub phase: PlayerPhase,
    pub match_id: Option<String>,
    pub server_addr: Option<String>,
}

// Outcome of an admin forced-state request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceOutcome {
    Applied,
    NotFound,
    Conflict,
}

// Work item handed to the dispatcher after a pairing commit. Carries a
// clock snapshot taken at commit time and the address as registered then.
#[derive(Debug, Clone)]
pub struct DispatchJob {
    pub server_id: String,
    pub address: String,
    pub match_id: String,
    pub player_ids: [String; 2],
    pub clock: VectorClock,
}

// Read-only snapshot of the whole system for the admin surface.
#[derive(Debug, Clone)]
pub struct ServerSnapshot {
    pub server_id: String,
    pub phase: ServerPhase,
    pub address: String,
    pub current_match: Option<String>,
    pub last_heartbeat_ms: u64,
}

#[derive(Debug, Clone)]
pub struct QueueSnapshot {
    pub player_id: String,
    pub waited_ms: u64,
}

#[derive(Debug, Clone)]
pub struct SystemSnapshot {
    pub servers: Vec<ServerSnapshot>,
    pub queue: Vec<QueueSnapshot>,
    pub clock: VectorClock,
}

/// Authoritative matchmaking state: player table, server registry, FIFO
/// queue, match table and the global vector clock.
///
/// The value itself is not synchronised; the application state wraps it in
/// a single `RwLock`, and every method here runs with that lock held for
/// its whole body. Read-your-writes for players follows from that: a
/// status read can only run after the write that preceded it committed.
pub struct Matchmaker {
    self_id: String,
    time: Arc<dyn TimeSource>,
    players: HashMap<String, PlayerRecord>,
    servers: HashMap<String, ServerRecord>,
    queue: VecDeque<QueueEntry>,
    matches: HashMap<String, MatchRecord>,
    clock: VectorClock,
}

impl Matchmaker {
    pub fn new(self_id: impl Into<String>, time: Arc<dyn TimeSource>) -> Self {
        Self {
            self_id: self_id.into(),
            time,
            players: HashMap::new(),
            servers: HashMap::new(),
            queue: VecDeque::new(),
            matches: HashMap::new(),
            clock: VectorClock::new(),
        }
    }

    pub fn clock(&self) -> &VectorClock {
        &self.clock
    }

    // Replies from game servers carry their clocks too; fold them in.
    pub fn observe_remote_clock(&mut self, remote: &VectorClock) {
        self.clock.merge(remote);
    }

    /// Enqueue a player, creating the record on first contact.
    pub fn queue_player(&mut self, request: &PlayerInfoRequest) -> EnqueueOutcome {
        self.clock.merge(&request.clock);
        self.clock.increment(&self.self_id);

        let now = self.time.now_epoch_millis();
        let player = self
            .players
            .entry(request.player_id.clone())
            .or_insert_with(|| PlayerRecord::new(request.player_id.clone()));

        match player.phase {
            PlayerPhase::InQueue => EnqueueOutcome::AlreadyInQueue,
            PlayerPhase::InMatch => EnqueueOutcome::InMatch,
            PlayerPhase::Idle => {
                player.phase = PlayerPhase::InQueue;
                player.match_id = None;
                player.last_op_ms = now;
                self.queue.push_back(QueueEntry {
                    player_id: request.player_id.clone(),
                    enqueued_at_ms: now,
                });
                tracing::info!(
                    player_id = %request.player_id,
                    game_mode = %request.game_mode,
                    queue_len = self.queue.len(),
                    "player queued"
                );
                EnqueueOutcome::Queued
            }
        }
    }

    /// Resolve a player's current state. Read-only with respect to the
    /// tables and the self clock component; the request clock still merges.
    pub fn player_status(&mut self, request: &PlayerStatusRequest) -> Option<PlayerView> {
        self.clock.merge(&request.clock);

        let player = self.players.get(&request.player_id)?;
        let (match_id, server_addr) = match (player.phase, player.match_id.as_ref()) {
            (PlayerPhase::InMatch, Some(match_id)) => {
                let address = self
                    .matches
                    .get(match_id)
                    .and_then(|record| self.servers.get(&record.server_id))
                    .map(|server| server.address.clone());
                (Some(match_id.clone()), address)
            }
            _ => (None, None),
        };

        Some(PlayerView {
            phase: player.phase,
            match_id,
            server_addr,
        })
    }

    /// Apply a server-initiated status update (registration, heartbeat,
    /// busy/available transitions, self-reported crash).
    pub fn update_server_status(&mut self, request: &ServerStatusUpdateRequest) {
        self.clock.merge(&request.clock);

        let now = self.time.now_epoch_millis();
        let mut completed_match = None;
        let mut went_down = false;
        {
            let server = self
                .servers
                .entry(request.server_id.clone())
                .or_insert_with(|| ServerRecord::new(request.server_id.clone(), now));
            if !request.address.is_empty() {
                server.address = request.address.clone();
            }
            server.last_heartbeat_ms = now;

            match request.new_status {
                ServerStatusUpdate::Available => {
                    server.phase = ServerPhase::Available;
                    // Coming back Available with a live match closes it.
                    completed_match = server.current_match.take();
                }
                ServerStatusUpdate::Busy => {
                    server.phase = ServerPhase::Busy;
                    // Only bind match ids we actually handed out.
                    if self.matches.contains_key(&request.match_id) {
                        server.current_match = Some(request.match_id.clone());
                    }
                }
                ServerStatusUpdate::Down => went_down = true,
            }
        }

        if let Some(match_id) = completed_match {
            self.close_match(&match_id);
        }
        if went_down {
            self.take_server_down(&request.server_id);
        }

        self.clock.increment(&self.self_id);
        tracing::info!(
            server_id = %request.server_id,
            new_status = ?request.new_status,
            "server status updated"
        );
    }

    /// Consistent copy of both tables for the admin view.
    pub fn system_status(&self) -> SystemSnapshot {
        let now = self.time.now_epoch_millis();
        let mut servers: Vec<ServerSnapshot> = self
            .servers
            .values()
            .map(|server| ServerSnapshot {
                server_id: server.id.clone(),
                phase: server.phase,
                address: server.address.clone(),
                current_match: server.current_match.clone(),
                last_heartbeat_ms: server.last_heartbeat_ms,
            })
            .collect();
        servers.sort_by(|a, b| a.server_id.cmp(&b.server_id));

        let queue = self
            .queue
            .iter()
            .map(|entry| QueueSnapshot {
                player_id: entry.player_id.clone(),
                waited_ms: now.saturating_sub(entry.enqueued_at_ms),
            })
            .collect();

        SystemSnapshot {
            servers,
            queue,
            clock: self.clock.clone(),
        }
    }

    /// Force a server's state from the admin surface. ForceAvailable from
    /// Busy is a policy conflict; ForceDown runs the usual down cleanup.
    pub fn force_server_state(&mut self, request: &AdminServerUpdateRequest) -> ForceOutcome {
        self.clock.merge(&request.clock);

        let phase = match self.servers.get(&request.server_id) {
            Some(server) => server.phase,
            None => return ForceOutcome::NotFound,
        };

        match request.forced_status {
            ForcedStatus::ForceAvailable => {
                if phase == ServerPhase::Busy {
                    return ForceOutcome::Conflict;
                }
                if let Some(server) = self.servers.get_mut(&request.server_id) {
                    server.phase = ServerPhase::Available;
                }
            }
            ForcedStatus::ForceDown => self.take_server_down(&request.server_id),
        }

        self.clock.increment(&self.self_id);
        tracing::warn!(
            server_id = %request.server_id,
            forced_status = ?request.forced_status,
            "server state forced by admin"
        );
        ForceOutcome::Applied
    }

    /// One pairing pass: form 1v1 matches while two players wait and an
    /// Available server exists. Commits every transition under the caller's
    /// lock and returns the dispatch jobs to run after the lock drops.
    pub fn form_matches(&mut self) -> Vec<DispatchJob> {
        let mut jobs = Vec::new();
        while self.queue.len() >= 2 {
            let Some(server_id) = self.pick_available_server() else {
                break;
            };
            let (Some(first), Some(second)) = (self.queue.pop_front(), self.queue.pop_front())
            else {
                break;
            };

            let match_id = self.fresh_match_id();
            let now = self.time.now_epoch_millis();
            for entry in [&first, &second] {
                let player = match self.players.get_mut(&entry.player_id) {
                    Some(player) => player,
                    // Queue membership without a player record cannot happen
                    // in a correct process; dying beats corrupting state.
                    None => panic!(
                        "invariant violation: queued player {} has no record",
                        entry.player_id
                    ),
                };
                player.phase = PlayerPhase::InMatch;
                player.match_id = Some(match_id.clone());
                player.last_op_ms = now;
            }

            let address = match self.servers.get_mut(&server_id) {
                Some(server) => {
                    server.phase = ServerPhase::Busy;
                    server.current_match = Some(match_id.clone());
                    server.address.clone()
                }
                None => panic!("invariant violation: selected server {server_id} vanished"),
            };

            self.matches.insert(
                match_id.clone(),
                MatchRecord {
                    id: match_id.clone(),
                    player_ids: [first.player_id.clone(), second.player_id.clone()],
                    server_id: server_id.clone(),
                },
            );
            self.clock.increment(&self.self_id);

            tracing::info!(
                match_id = %match_id,
                server_id = %server_id,
                player_one = %first.player_id,
                player_two = %second.player_id,
                "match formed, dispatching assignment"
            );
            jobs.push(DispatchJob {
                server_id,
                address,
                match_id,
                player_ids: [first.player_id, second.player_id],
                clock: self.clock.clone(),
            });
        }
        jobs
    }

    /// Liveness sweep: any server not already Down whose heartbeat is older
    /// than the timeout goes Down, abandoning its current match.
    pub fn sweep_heartbeats(&mut self, timeout_ms: u64) {
        let now = self.time.now_epoch_millis();
        let stale: Vec<String> = self
            .servers
            .values()
            .filter(|server| {
                server.phase != ServerPhase::Down
                    && now.saturating_sub(server.last_heartbeat_ms) > timeout_ms
            })
            .map(|server| server.id.clone())
            .collect();

        for server_id in stale {
            tracing::warn!(%server_id, "heartbeat deadline missed, marking server down");
            self.take_server_down(&server_id);
            self.clock.increment(&self.self_id);
        }
    }

    /// Undo a committed pairing after its dispatch failed. Players return
    /// to the queue head in their original order; the match record goes
    /// away. A lost server (timeout, transport error) also goes Down, while
    /// a refusing server merely drops back to Unknown until it reports in.
    pub fn recover_assignment(&mut self, job: &DispatchJob, server_lost: bool) {
        tracing::warn!(
            match_id = %job.match_id,
            server_id = %job.server_id,
            server_lost,
            "assignment failed, returning players to queue head"
        );
        self.requeue_match_players(&job.match_id);

        if server_lost {
            self.take_server_down(&job.server_id);
        } else if let Some(server) = self.servers.get_mut(&job.server_id) {
            if server.current_match.as_deref() == Some(job.match_id.as_str()) {
                server.current_match = None;
                server.phase = ServerPhase::Unknown;
            }
        }

        self.clock.increment(&self.self_id);
    }

    // Match completion: drop the record and idle both players.
    fn close_match(&mut self, match_id: &str) {
        let Some(record) = self.matches.remove(match_id) else {
            return;
        };
        let now = self.time.now_epoch_millis();
        for player_id in &record.player_ids {
            if let Some(player) = self.players.get_mut(player_id) {
                if player.phase == PlayerPhase::InMatch
                    && player.match_id.as_deref() == Some(match_id)
                {
                    player.phase = PlayerPhase::Idle;
                    player.match_id = None;
                    player.last_op_ms = now;
                }
            }
        }
        tracing::info!(match_id, "match completed");
    }

    // Down transition shared by status updates, the sweep, admin overrides
    // and failed dispatches. Abandons the server's current match.
    fn take_server_down(&mut self, server_id: &str) {
        let abandoned = match self.servers.get_mut(server_id) {
            Some(server) => {
                server.phase = ServerPhase::Down;
                server.current_match.take()
            }
            None => None,
        };
        if let Some(match_id) = abandoned {
            self.requeue_match_players(&match_id);
        }
    }

    // Return an abandoned match's players to the queue head. Reverse
    // insertion keeps the pair's original relative order.
    fn requeue_match_players(&mut self, match_id: &str) {
        let Some(record) = self.matches.remove(match_id) else {
            return;
        };
        let now = self.time.now_epoch_millis();
        for player_id in record.player_ids.iter().rev() {
            let Some(player) = self.players.get_mut(player_id) else {
                continue;
            };
            // Skip players that already moved on (completed, re-queued).
            if player.phase != PlayerPhase::InMatch
                || player.match_id.as_deref() != Some(match_id)
            {
                continue;
            }
            player.phase = PlayerPhase::InQueue;
            player.match_id = None;
            player.last_op_ms = now;
            if self.queue.iter().all(|entry| entry.player_id != *player_id) {
                self.queue.push_front(QueueEntry {
                    player_id: player_id.clone(),
                    enqueued_at_ms: now,
                });
            }
        }
    }

    // Deterministic server choice: longest-registered Available server,
    // ties broken by smallest id.
    fn pick_available_server(&self) -> Option<String> {
        self.servers
            .values()
            .filter(|server| server.phase == ServerPhase::Available)
            .min_by(|a, b| {
                a.registered_at_ms
                    .cmp(&b.registered_at_ms)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|server| server.id.clone())
    }

    fn fresh_match_id(&self) -> String {
        loop {
            let candidate = build_match_id();
            if !self.matches.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}
