//! # Client Components
//!
//! - [`agent`]: plays one game against a server
//! - [`limiter`]: runs many agents with a bounded number in flight
//! - [`metrics`]: per-game records and the load-test aggregate

pub mod agent;
pub mod limiter;
pub mod metrics;

pub use agent::{AgentOutcome, ClientAgent, GameReport, Verdict};
pub use limiter::Limiter;
pub use metrics::ClientMetrics;
