//! # Common Components
//!
//! Shared pieces used by both the server and the client side.
//!
//! ## Modules
//!
//! - [`messages`]: the four War frames and their byte encoding
//! - [`connection`]: exact-size framed reads and writes over a stream
//! - [`errors`]: the error taxonomy
//! - [`config`]: configuration parsing utilities

pub mod config;
pub mod connection;
pub mod errors;
pub mod messages;
