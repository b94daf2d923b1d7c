// Interface adapters: assignment endpoint and the matchmaker client.

pub mod clients;
pub mod handlers;
pub mod routes;
pub mod state;
