//! # Framed Connection
//!
//! Wraps a byte stream (a `TcpStream` in production, a `tokio::io::duplex`
//! pipe in tests) and moves whole War frames over it.
//!
//! Reads accumulate until a full frame is available. A read that returns zero
//! bytes before the frame is complete means the peer is gone and surfaces as
//! [`WarError::ConnectionClosed`]; it is never retried.

use std::io;
use std::time::Duration;

use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use super::errors::{Result, WarError};
use super::messages::{Command, Message, RoundResult};
use crate::game::cards::{Card, Hand};

/// Read exactly `n` bytes from `stream`.
///
/// Fails with [`WarError::ConnectionClosed`] when the stream reaches EOF first.
pub async fn read_exact<S>(stream: &mut S, n: usize) -> Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; n];
    let mut received = 0;
    while received < n {
        match stream.read(&mut buf[received..]).await? {
            0 => return Err(WarError::ConnectionClosed { expected: n, received }),
            read => received += read,
        }
    }
    Ok(buf)
}

/// A stream owned by exactly one session or agent.
///
/// Closing is idempotent: the stream is shut down and released the first time
/// [`Connection::close`] runs, and every later call is a no-op. Dropping an
/// unclosed connection drops the stream, which closes the socket too.
pub struct Connection<S = TcpStream> {
    /// `None` once closed
    stream: Option<S>,
    /// Bound applied to each frame read
    read_timeout: Option<Duration>,
    /// Peer label for logs
    peer: String,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: impl Into<String>) -> Self {
        Self {
            stream: Some(stream),
            read_timeout: None,
            peer: peer.into(),
        }
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    fn stream(&mut self) -> Result<&mut S> {
        self.stream
            .as_mut()
            .ok_or_else(|| WarError::Io(io::ErrorKind::NotConnected.into()))
    }

    /// Read one frame that must carry the `expected` command.
    pub async fn read_message(&mut self, expected: Command) -> Result<Message> {
        let frame = self.read_frame(expected).await?;
        Message::decode(expected, &frame)
    }

    /// Read a PlayCard frame and return the card.
    pub async fn read_card(&mut self) -> Result<Card> {
        let frame = self.read_frame(Command::PlayCard).await?;
        Card::try_from(frame[1])
    }

    /// Read a GameStart frame and return the dealt hand.
    pub async fn read_hand(&mut self) -> Result<Hand> {
        let frame = self.read_frame(Command::GameStart).await?;
        Hand::try_from(&frame[1..])
    }

    /// Read a PlayResult frame and return the result.
    pub async fn read_result(&mut self) -> Result<RoundResult> {
        let frame = self.read_frame(Command::PlayResult).await?;
        RoundResult::try_from(frame[1])
    }

    /// Read the raw bytes of one `expected` frame, tag included.
    ///
    /// The tag byte is checked before the payload is read, so a peer sending
    /// the wrong frame is rejected without waiting for more bytes.
    async fn read_frame(&mut self, expected: Command) -> Result<Vec<u8>> {
        match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, self.read_frame_unbounded(expected))
                .await
                .map_err(|_| WarError::Timeout(limit))?,
            None => self.read_frame_unbounded(expected).await,
        }
    }

    async fn read_frame_unbounded(&mut self, expected: Command) -> Result<Vec<u8>> {
        let stream = self.stream()?;

        let tag = read_exact(stream, 1).await?;
        let command = Command::try_from(tag[0])?;
        if command != expected {
            return Err(WarError::violation(format!(
                "expected {expected:?}, received {command:?}"
            )));
        }

        let mut frame = tag;
        let payload = read_exact(stream, expected.frame_len() - 1)
            .await
            .map_err(|e| match e {
                WarError::ConnectionClosed { expected: n, received } => WarError::ConnectionClosed {
                    expected: n + 1,
                    received: received + 1,
                },
                other => other,
            })?;
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    pub async fn write_message(&mut self, message: &Message) -> Result<()> {
        self.write_frame(&message.encode()).await
    }

    /// Write an already-encoded frame and flush it.
    pub async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let stream = self.stream()?;
        stream.write_all(frame).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Shut the stream down and release it. Returns `true` only for the call
    /// that actually closed it.
    pub async fn close(&mut self) -> bool {
        match self.stream.take() {
            Some(mut stream) => {
                if let Err(e) = stream.shutdown().await {
                    debug!("🔌 Shutdown of {} failed: {}", self.peer, e);
                }
                debug!("🔌 Closed connection to {}", self.peer);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_read_exact_accumulates_partial_writes() {
        let (mut reader, mut writer) = duplex(64);
        tokio::spawn(async move {
            writer.write_all(&[1, 2]).await.unwrap();
            tokio::task::yield_now().await;
            writer.write_all(&[3]).await.unwrap();
        });
        assert_eq!(read_exact(&mut reader, 3).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_read_exact_fails_on_eof() {
        let (mut reader, mut writer) = duplex(64);
        writer.write_all(&[2]).await.unwrap();
        drop(writer);
        assert!(matches!(
            read_exact(&mut reader, 2).await,
            Err(WarError::ConnectionClosed { expected: 2, received: 1 })
        ));
    }

    #[tokio::test]
    async fn test_read_message_reports_full_frame_sizes() {
        let (client, mut server) = duplex(64);
        let mut conn = Connection::new(client, "test");
        server.write_all(&[1, 0, 1, 2]).await.unwrap();
        drop(server);
        assert!(matches!(
            conn.read_message(Command::GameStart).await,
            Err(WarError::ConnectionClosed { expected: 27, received: 4 })
        ));
    }

    #[tokio::test]
    async fn test_wrong_tag_rejected_before_payload() {
        let (client, mut server) = duplex(64);
        let mut conn = Connection::new(client, "test");
        // Only the tag is sent, the reader must not wait for the payload
        server.write_all(&[2]).await.unwrap();
        assert!(matches!(
            conn.read_message(Command::WantGame).await,
            Err(WarError::ProtocolViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_typed_reads_validate_payloads() {
        let (client, mut server) = duplex(64);
        let mut conn = Connection::new(client, "test");

        server.write_all(&[2, 18, 3, 2, 2, 60]).await.unwrap();
        assert_eq!(conn.read_card().await.unwrap(), Card::new(18).unwrap());
        assert_eq!(conn.read_result().await.unwrap(), RoundResult::Lose);
        assert!(matches!(conn.read_card().await, Err(WarError::ProtocolViolation(_))));

        server.write_all(&[3, 0]).await.unwrap();
        assert!(matches!(conn.read_hand().await, Err(WarError::ProtocolViolation(_))));
    }

    #[tokio::test]
    async fn test_read_timeout() {
        let (client, _server) = duplex(64);
        let mut conn = Connection::new(client, "test").with_read_timeout(Some(Duration::from_millis(20)));
        assert!(matches!(
            conn.read_message(Command::PlayCard).await,
            Err(WarError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (client, mut server) = duplex(64);
        let mut conn = Connection::new(client, "test");
        conn.write_message(&Message::PlayCard(Card::new(7).unwrap())).await.unwrap();

        assert!(conn.close().await);
        assert!(!conn.close().await);
        assert!(conn.is_closed());
        assert!(conn.write_message(&Message::WantGame).await.is_err());

        let mut received = Vec::new();
        server.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, vec![2, 7]);
    }
}
