// Use cases layer: the authoritative matchmaking core and its tasks.

pub mod matchmaker;
pub mod pairing;

#[cfg(test)]
pub(crate) mod test_support;

pub use matchmaker::{DispatchJob, EnqueueOutcome, ForceOutcome, Matchmaker, PlayerView};
