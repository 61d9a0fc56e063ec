//! # Server Components
//!
//! - [`matchmaker`]: accepts and pairs connections, one task per pair
//! - [`session`]: the per-pair game state machine

pub mod matchmaker;
pub mod session;

pub use matchmaker::Matchmaker;
pub use session::{GameSession, SessionReport, SessionState};
