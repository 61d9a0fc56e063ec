//! # Client Agent
//!
//! Plays exactly one game from the client side: ask for a game, receive a
//! hand, play its 26 cards in order and total the results.
//!
//! Failures never escape the agent as errors. [`ClientAgent::play`] always
//! returns an [`AgentOutcome`], and a failed game is simply not counted.

use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::common::config::ClientSettings;
use crate::common::connection::Connection;
use crate::common::errors::{Result, WarError};
use crate::common::messages::Message;

/// How a finished game went for this agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Won,
    Lost,
    Drew,
}

impl Verdict {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s > 0 => Verdict::Won,
            s if s < 0 => Verdict::Lost,
            _ => Verdict::Drew,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Verdict::Won => "won",
            Verdict::Lost => "lost",
            Verdict::Drew => "drew",
        };
        f.write_str(word)
    }
}

/// Net score of a completed game and its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameReport {
    pub score: i32,
    pub verdict: Verdict,
}

impl GameReport {
    pub fn from_score(score: i32) -> Self {
        Self {
            score,
            verdict: Verdict::from_score(score),
        }
    }
}

/// Result of one agent attempt.
#[derive(Debug)]
pub enum AgentOutcome {
    Finished(GameReport),
    Failed(WarError),
}

impl AgentOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self, AgentOutcome::Finished(_))
    }
}

/// Connects to a server and plays one game per [`ClientAgent::play`] call.
#[derive(Debug, Clone)]
pub struct ClientAgent {
    address: String,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
}

impl ClientAgent {
    pub fn new(address: impl Into<String>, settings: &ClientSettings) -> Self {
        Self {
            address: address.into(),
            connect_timeout: settings.connect_timeout(),
            read_timeout: settings.read_timeout(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Connect and play one game. Never fails: errors become
    /// [`AgentOutcome::Failed`].
    pub async fn play(&self) -> AgentOutcome {
        let mut conn = match self.connect().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("❌ Could not connect to {}: {}", self.address, e);
                return AgentOutcome::Failed(e);
            }
        };

        let outcome = match play_game(&mut conn).await {
            Ok(report) => {
                debug!("Game complete, I {} ({:+})", report.verdict, report.score);
                AgentOutcome::Finished(report)
            }
            Err(e) => {
                warn!("❌ Game against {} failed: {}", self.address, e);
                AgentOutcome::Failed(e)
            }
        };
        conn.close().await;
        outcome
    }

    async fn connect(&self) -> Result<Connection> {
        let stream = match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, TcpStream::connect(&self.address))
                .await
                .map_err(|_| WarError::Timeout(limit))??,
            None => TcpStream::connect(&self.address).await?,
        };
        stream.set_nodelay(true)?;
        info!("🔗 Connected to {}", self.address);
        Ok(Connection::new(stream, self.address.clone()).with_read_timeout(self.read_timeout))
    }
}

/// Play one full game over an established connection.
pub async fn play_game<S>(conn: &mut Connection<S>) -> Result<GameReport>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    conn.write_message(&Message::WantGame).await?;

    let hand = conn.read_hand().await?;

    let mut score = 0;
    for card in hand.iter() {
        conn.write_message(&Message::PlayCard(card)).await?;
        score += conn.read_result().await?.score();
    }

    Ok(GameReport::from_score(score))
}
