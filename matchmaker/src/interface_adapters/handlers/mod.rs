pub mod admin;
pub mod players;
pub mod servers;
