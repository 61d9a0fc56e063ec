//! # Concurrency Limiter
//!
//! Runs `N` agent games with at most `L` in flight. The first `L` are started
//! together; after that, one more starts each time one finishes, until all
//! `N` have been attempted. Games finish in any order.
//!
//! All agents live on the tokio runtime as lightweight tasks in one
//! [`JoinSet`]. The aggregate is owned by the loop below and needs no lock.

use std::future::Future;
use std::time::{Duration, Instant};

use log::{error, info};
use tokio::task::JoinSet;

use super::agent::{AgentOutcome, ClientAgent};
use super::metrics::ClientMetrics;

pub struct Limiter {
    max_in_flight: usize,
}

impl Limiter {
    /// `max_in_flight` is clamped to at least one.
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Play `total` games against `agent`'s server.
    pub async fn run_agents(&self, agent: &ClientAgent, total: usize) -> ClientMetrics {
        info!(
            "🚀 Launching {} clients against {} ({} at a time)",
            total,
            agent.address(),
            self.max_in_flight
        );
        let metrics = self
            .run(total, |_| {
                let agent = agent.clone();
                async move { agent.play().await }
            })
            .await;
        info!("{} completed clients", metrics.completed());
        metrics
    }

    /// Run `total` attempts produced by `launch`, keeping at most
    /// `max_in_flight` of them running.
    pub async fn run<F, Fut>(&self, total: usize, mut launch: F) -> ClientMetrics
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = AgentOutcome> + Send + 'static,
    {
        let mut metrics = ClientMetrics::new();
        let mut in_flight: JoinSet<(usize, Duration, AgentOutcome)> = JoinSet::new();
        let mut launched = 0;

        loop {
            while launched < total && in_flight.len() < self.max_in_flight {
                let attempt = launch(launched);
                let agent_id = launched;
                in_flight.spawn(async move {
                    let started = Instant::now();
                    let outcome = attempt.await;
                    (agent_id, started.elapsed(), outcome)
                });
                launched += 1;
            }

            match in_flight.join_next().await {
                Some(Ok((agent_id, latency, outcome))) => metrics.record_game(agent_id, latency, &outcome),
                Some(Err(e)) => error!("❌ Agent task failed: {}", e),
                None => break,
            }
        }

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::agent::GameReport;
    use crate::common::errors::WarError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_never_exceeds_ceiling() {
        let limiter = Limiter::new(4);
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let metrics = limiter
            .run(25, |i| {
                let current = current.clone();
                let peak = peak.clone();
                async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5 + (i as u64 % 3) * 5)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    AgentOutcome::Finished(GameReport::from_score(1))
                }
            })
            .await;

        assert_eq!(metrics.games().len(), 25);
        assert_eq!(metrics.completed(), 25);
        assert_eq!(peak.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_the_batch() {
        let limiter = Limiter::new(3);
        let metrics = limiter
            .run(10, |i| async move {
                if i % 2 == 0 {
                    AgentOutcome::Failed(WarError::ConnectionClosed { expected: 2, received: 0 })
                } else {
                    AgentOutcome::Finished(GameReport::from_score(-3))
                }
            })
            .await;

        let stats = metrics.aggregate();
        assert_eq!(stats.total_games, 10);
        assert_eq!(stats.completed_games, 5);
        assert_eq!(stats.lost, 5);
        assert_eq!(stats.failure_reasons.get("connection_closed"), Some(&5));
    }

    #[tokio::test]
    async fn test_zero_games() {
        let limiter = Limiter::new(0);
        assert_eq!(limiter.max_in_flight(), 1);

        let metrics = limiter
            .run(0, |_| async { AgentOutcome::Finished(GameReport::from_score(0)) })
            .await;
        assert!(metrics.games().is_empty());
    }
}
