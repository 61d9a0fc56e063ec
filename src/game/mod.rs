//! # Game Rules
//!
//! - [`cards`]: card values, hands and the rank comparator
//! - [`dealer`]: shuffling and splitting the deck

pub mod cards;
pub mod dealer;

pub use cards::{compare, Card, Hand};
pub use dealer::{Deal, DealSource, Dealer};
