//! # War
//!
//! The two-player card game War over TCP: a matchmaking server that referees
//! games between pairs of connections, a client agent that plays one game, and
//! a limiter that runs many agents at once to load-test the server.

pub mod client;
pub mod common;
pub mod game;
pub mod server;

pub use common::errors::WarError;
pub use common::messages::Message;
pub use server::Matchmaker;
