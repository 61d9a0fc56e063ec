//! # Message Protocol
//!
//! The four frames of the War protocol. Every frame starts with a one-byte
//! command tag and has a fixed total size:
//!
//! ```text
//! tag 0  WantGame    [0, 0]                 2 bytes
//! tag 1  GameStart   [1, c0, c1, .., c25]  27 bytes
//! tag 2  PlayCard    [2, card]              2 bytes
//! tag 3  PlayResult  [3, result]            2 bytes
//! ```
//!
//! Session flow: `WantGame x2 -> GameStart x2 -> (PlayCard x2 -> PlayResult x2) x 26`.

use std::cmp::Ordering;

use crate::common::errors::{Result, WarError};
use crate::game::cards::{Card, Hand, HAND_SIZE};

// ============================================================================
// TAGS
// ============================================================================

/// First byte of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    WantGame = 0,
    GameStart = 1,
    PlayCard = 2,
    PlayResult = 3,
}

impl Command {
    /// Total frame size, tag included.
    pub const fn frame_len(self) -> usize {
        match self {
            Command::GameStart => 1 + HAND_SIZE,
            Command::WantGame | Command::PlayCard | Command::PlayResult => 2,
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = WarError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Command::WantGame),
            1 => Ok(Command::GameStart),
            2 => Ok(Command::PlayCard),
            3 => Ok(Command::PlayResult),
            other => Err(WarError::violation(format!("unknown command tag {other}"))),
        }
    }
}

/// Payload byte of a PlayResult frame, from the receiver's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RoundResult {
    Win = 0,
    Draw = 1,
    Lose = 2,
}

impl RoundResult {
    /// Results for both players of a round, given how the first player's
    /// card compares to the second's. Always complementary.
    pub fn pair(first_vs_second: Ordering) -> (RoundResult, RoundResult) {
        match first_vs_second {
            Ordering::Greater => (RoundResult::Win, RoundResult::Lose),
            Ordering::Equal => (RoundResult::Draw, RoundResult::Draw),
            Ordering::Less => (RoundResult::Lose, RoundResult::Win),
        }
    }

    /// Contribution to a player's net score.
    pub fn score(self) -> i32 {
        match self {
            RoundResult::Win => 1,
            RoundResult::Draw => 0,
            RoundResult::Lose => -1,
        }
    }
}

impl TryFrom<u8> for RoundResult {
    type Error = WarError;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(RoundResult::Win),
            1 => Ok(RoundResult::Draw),
            2 => Ok(RoundResult::Lose),
            other => Err(WarError::violation(format!("unknown round result {other}"))),
        }
    }
}

// ============================================================================
// MESSAGES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Sent by a client to ask for a game.
    WantGame,
    /// Sent by the server with the receiver's hand.
    GameStart(Hand),
    /// Sent by a client with the card it plays this round.
    PlayCard(Card),
    /// Sent by the server with the round outcome for the receiver.
    PlayResult(RoundResult),
}

impl Message {
    pub fn command(&self) -> Command {
        match self {
            Message::WantGame => Command::WantGame,
            Message::GameStart(_) => Command::GameStart,
            Message::PlayCard(_) => Command::PlayCard,
            Message::PlayResult(_) => Command::PlayResult,
        }
    }

    /// Encode into the exact bytes sent on the wire.
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(self.command().frame_len());
        frame.push(self.command() as u8);
        match self {
            Message::WantGame => frame.push(0),
            Message::GameStart(hand) => frame.extend_from_slice(&hand.to_bytes()),
            Message::PlayCard(card) => frame.push(card.value()),
            Message::PlayResult(result) => frame.push(*result as u8),
        }
        frame
    }

    /// Decode a complete frame, accepting only the `expected` command.
    ///
    /// Any other tag, a wrong length or an invalid payload is a
    /// [`WarError::ProtocolViolation`].
    pub fn decode(expected: Command, frame: &[u8]) -> Result<Self> {
        let (&tag, payload) = frame
            .split_first()
            .ok_or_else(|| WarError::violation("empty frame"))?;

        let command = Command::try_from(tag)?;
        if command != expected {
            return Err(WarError::violation(format!(
                "expected {expected:?}, received {command:?}"
            )));
        }
        if frame.len() != expected.frame_len() {
            return Err(WarError::violation(format!(
                "{expected:?} frame is {} bytes, expected {}",
                frame.len(),
                expected.frame_len()
            )));
        }

        match command {
            Command::WantGame => match payload[0] {
                0 => Ok(Message::WantGame),
                other => Err(WarError::violation(format!("WantGame reserved byte is {other}"))),
            },
            Command::GameStart => Ok(Message::GameStart(Hand::try_from(payload)?)),
            Command::PlayCard => Ok(Message::PlayCard(Card::try_from(payload[0])?)),
            Command::PlayResult => Ok(Message::PlayResult(RoundResult::try_from(payload[0])?)),
        }
    }
}
