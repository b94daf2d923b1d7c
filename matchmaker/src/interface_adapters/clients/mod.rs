// Outbound reqwest clients for talking to external services.

pub mod game_server;
