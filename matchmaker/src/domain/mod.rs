// Domain layer: authoritative entities and the ports the core depends on.

pub mod entities;
pub mod ports;

pub use entities::{
    build_match_id, MatchRecord, PlayerPhase, PlayerRecord, QueueEntry, ServerPhase, ServerRecord,
};
