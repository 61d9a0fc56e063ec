//! # Game Session
//!
//! One refereed game between exactly two connections. The session owns both
//! connections for its whole life and runs a linear state machine:
//!
//! ```text
//! AwaitWantGame -> Dealing -> Round(1) -> ... -> Round(26) -> Completed
//!        \            \            \                  \
//!         +------------+------------+------------------+--> Killed
//! ```
//!
//! The first error of any kind moves the session to `Killed`. There is no
//! recovery path. Both connections are closed exactly once when the session
//! reaches either terminal state, and dropping a session (for instance while
//! a panic unwinds) drops both streams.

use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::common::connection::Connection;
use crate::common::errors::{Result, WarError};
use crate::common::messages::{Command, Message, RoundResult};
use crate::game::cards::{compare, HAND_SIZE};
use crate::game::dealer::{DealSource, Dealer};

/// Where a session is in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a WantGame frame from each player
    AwaitWantGame,
    /// Sending both hands
    Dealing,
    /// Playing round `n` (1-based)
    Round(usize),
    /// All 26 rounds played
    Completed,
    /// Aborted on the first error
    Killed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Killed)
    }
}

/// What a finished session reports back.
#[derive(Debug)]
pub struct SessionReport {
    pub id: u64,
    pub state: SessionState,
    pub rounds_played: usize,
    /// Rounds won by the first and the second player
    pub wins: [usize; 2],
    pub draws: usize,
    /// State the session was in when it was killed
    pub failed_in: Option<SessionState>,
    /// Why the session was killed
    pub error: Option<WarError>,
}

/// Owning record of one game: two connections, a round counter and a state.
pub struct GameSession<S = TcpStream, D = Dealer> {
    id: u64,
    players: [Connection<S>; 2],
    dealer: D,
    state: SessionState,
    rounds_played: usize,
    wins: [usize; 2],
    draws: usize,
}

impl<S, D> GameSession<S, D>
where
    S: AsyncRead + AsyncWrite + Unpin,
    D: DealSource,
{
    pub fn new(id: u64, first: Connection<S>, second: Connection<S>, dealer: D) -> Self {
        Self {
            id,
            players: [first, second],
            dealer,
            state: SessionState::AwaitWantGame,
            rounds_played: 0,
            wins: [0, 0],
            draws: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the game to a terminal state, close both connections and report.
    ///
    /// Consumes the session, so it can only ever run once.
    pub async fn run(mut self) -> SessionReport {
        info!(
            "🎮 Session {} started: {} vs {}",
            self.id,
            self.players[0].peer(),
            self.players[1].peer()
        );

        let result = self.play().await;
        let failed_in = result.is_err().then_some(self.state);
        self.state = match result {
            Ok(()) => SessionState::Completed,
            Err(_) => SessionState::Killed,
        };
        self.close().await;

        match (&result, failed_in) {
            (Err(e), Some(phase)) => warn!("💀 Session {} killed during {:?}: {}", self.id, phase, e),
            _ => info!(
                "🏁 Session {} completed: {}-{} with {} draws",
                self.id, self.wins[0], self.wins[1], self.draws
            ),
        }

        SessionReport {
            id: self.id,
            state: self.state,
            rounds_played: self.rounds_played,
            wins: self.wins,
            draws: self.draws,
            failed_in,
            error: result.err(),
        }
    }

    async fn play(&mut self) -> Result<()> {
        self.state = SessionState::AwaitWantGame;
        self.await_want_game().await?;

        self.state = SessionState::Dealing;
        self.deal().await?;

        for round in 1..=HAND_SIZE {
            self.state = SessionState::Round(round);
            self.play_round().await?;
            self.rounds_played = round;
        }
        Ok(())
    }

    async fn await_want_game(&mut self) -> Result<()> {
        let [first, second] = &mut self.players;
        tokio::try_join!(
            first.read_message(Command::WantGame),
            second.read_message(Command::WantGame)
        )?;
        debug!("Session {}: both players want a game", self.id);
        Ok(())
    }

    async fn deal(&mut self) -> Result<()> {
        let deal = self.dealer.deal();
        let [first, second] = &mut self.players;
        tokio::try_join!(
            first.write_frame(deal.game_start_frame(0)),
            second.write_frame(deal.game_start_frame(1))
        )?;
        debug!("Session {}: hands dealt", self.id);
        Ok(())
    }

    /// Read both cards concurrently, then send the complementary results.
    async fn play_round(&mut self) -> Result<()> {
        let [first, second] = &mut self.players;
        let (a, b) = tokio::try_join!(first.read_card(), second.read_card())?;

        let (result_a, result_b) = RoundResult::pair(compare(a, b));
        let (message_a, message_b) = (Message::PlayResult(result_a), Message::PlayResult(result_b));
        tokio::try_join!(first.write_message(&message_a), second.write_message(&message_b))?;

        match result_a {
            RoundResult::Win => self.wins[0] += 1,
            RoundResult::Lose => self.wins[1] += 1,
            RoundResult::Draw => self.draws += 1,
        }
        debug!(
            "Session {} {:?}: {} vs {} -> {:?}/{:?}",
            self.id, self.state, a, b, result_a, result_b
        );
        Ok(())
    }

    async fn close(&mut self) {
        for player in &mut self.players {
            player.close().await;
        }
    }
}
