// Domain layer: the local match lifecycle.

pub mod session;

pub use session::{AcceptOutcome, MatchSession, ServerPhase};
