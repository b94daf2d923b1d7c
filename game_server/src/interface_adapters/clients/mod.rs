// Reqwest clients for talking to external services.

pub mod matchmaker;
