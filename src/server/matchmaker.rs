//! # Matchmaker
//!
//! Accepts TCP connections, pairs them in arrival order and spawns one
//! [`GameSession`] task per pair. The accept loop never waits on a session.
//!
//! When the shutdown future resolves the matchmaker stops accepting, closes a
//! connection still waiting for a partner, and gives running sessions the
//! configured grace period before aborting whatever is left.

use std::future::Future;
use std::net::SocketAddr;

use anyhow::Result;
use log::{debug, error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

use super::session::{GameSession, SessionReport};
use crate::common::config::ServerSettings;
use crate::common::connection::Connection;
use crate::game::dealer::Dealer;

pub struct Matchmaker {
    listener: TcpListener,
    settings: ServerSettings,
    /// Connection waiting for an opponent
    waiting: Option<Connection>,
    sessions: JoinSet<SessionReport>,
    sessions_started: u64,
}

impl Matchmaker {
    /// Bind the listening socket.
    pub async fn bind(address: &str, settings: ServerSettings) -> Result<Self> {
        let listener = TcpListener::bind(address).await?;
        info!("📡 War server listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            settings,
            waiting: None,
            sessions: JoinSet::new(),
            sessions_started: 0,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> Result<u64> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("❌ Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve until `shutdown` resolves. Returns how many sessions were started.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<u64>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("🛑 Shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((socket, addr)) => self.on_connection(socket, addr),
                    Err(e) => error!("❌ Accept error: {}", e),
                },
                Some(joined) = self.sessions.join_next(), if !self.sessions.is_empty() => {
                    if let Err(e) = joined {
                        error!("❌ Session task failed: {}", e);
                    }
                }
            }
        }

        self.shutdown().await;
        Ok(self.sessions_started)
    }

    fn on_connection(&mut self, socket: TcpStream, addr: SocketAddr) {
        debug!("🔗 Accepted connection from {}", addr);
        if let Err(e) = socket.set_nodelay(true) {
            debug!("Could not set TCP_NODELAY for {}: {}", addr, e);
        }
        let conn = Connection::new(socket, addr.to_string()).with_read_timeout(self.settings.read_timeout());

        match self.waiting.take() {
            None => self.waiting = Some(conn),
            Some(first) => {
                self.sessions_started += 1;
                let session = GameSession::new(self.sessions_started, first, conn, Dealer::new());
                self.sessions.spawn(session.run());
            }
        }
    }

    async fn shutdown(&mut self) {
        if let Some(mut unpaired) = self.waiting.take() {
            unpaired.close().await;
        }

        if self.sessions.is_empty() {
            return;
        }

        let grace = self.settings.shutdown_grace();
        info!(
            "⏳ Waiting up to {:?} for {} running sessions",
            grace,
            self.sessions.len()
        );
        let drained = tokio::time::timeout(grace, async {
            while self.sessions.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!("⚠️ Aborting {} sessions still running", self.sessions.len());
            self.sessions.shutdown().await;
        }
    }
}
