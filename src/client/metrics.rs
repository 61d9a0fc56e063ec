use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use super::agent::{AgentOutcome, Verdict};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetric {
    pub agent_id: usize,
    pub latency_ms: u64,
    pub verdict: Option<Verdict>,
    pub score: Option<i32>,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AggregatedStats {
    pub total_games: usize,
    pub completed_games: usize,
    pub failed_games: usize,
    pub failure_rate: f64,

    pub won: usize,
    pub lost: usize,
    pub drew: usize,

    // Latency statistics over completed games (milliseconds)
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    pub latency_avg_ms: f64,
    pub latency_p50_ms: u64,
    pub latency_p95_ms: u64,
    pub latency_p99_ms: u64,

    // Failure kinds breakdown
    pub failure_reasons: HashMap<String, usize>,
}

#[derive(Debug)]
pub struct ClientMetrics {
    start_time: Instant,
    games: Vec<GameMetric>,
}

impl Default for ClientMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            games: Vec::new(),
        }
    }

    pub fn record_game(&mut self, agent_id: usize, latency: Duration, outcome: &AgentOutcome) {
        let (verdict, score, failure_reason) = match outcome {
            AgentOutcome::Finished(report) => (Some(report.verdict), Some(report.score), None),
            AgentOutcome::Failed(e) => (None, None, Some(e.kind().to_string())),
        };

        self.games.push(GameMetric {
            agent_id,
            latency_ms: latency.as_millis() as u64,
            verdict,
            score,
            failure_reason,
        });
    }

    pub fn games(&self) -> &[GameMetric] {
        &self.games
    }

    pub fn completed(&self) -> usize {
        self.games.iter().filter(|g| g.verdict.is_some()).count()
    }

    pub fn aggregate(&self) -> AggregatedStats {
        let mut stats = AggregatedStats::default();

        if self.games.is_empty() {
            return stats;
        }

        stats.total_games = self.games.len();
        stats.completed_games = self.completed();
        stats.failed_games = stats.total_games - stats.completed_games;
        stats.failure_rate = (stats.failed_games as f64 / stats.total_games as f64) * 100.0;

        for verdict in self.games.iter().filter_map(|g| g.verdict) {
            match verdict {
                Verdict::Won => stats.won += 1,
                Verdict::Lost => stats.lost += 1,
                Verdict::Drew => stats.drew += 1,
            }
        }

        let mut latencies: Vec<u64> = self
            .games
            .iter()
            .filter(|g| g.verdict.is_some())
            .map(|g| g.latency_ms)
            .collect();

        latencies.sort_unstable();
        if let (Some(&min), Some(&max)) = (latencies.first(), latencies.last()) {
            stats.latency_min_ms = min;
            stats.latency_max_ms = max;
            stats.latency_avg_ms = latencies.iter().sum::<u64>() as f64 / latencies.len() as f64;

            stats.latency_p50_ms = percentile(&latencies, 50.0);
            stats.latency_p95_ms = percentile(&latencies, 95.0);
            stats.latency_p99_ms = percentile(&latencies, 99.0);
        }

        for game in &self.games {
            if let Some(reason) = &game.failure_reason {
                *stats.failure_reasons.entry(reason.clone()).or_insert(0) += 1;
            }
        }

        stats
    }

    pub fn export_to_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let stats = self.aggregate();

        let output = serde_json::json!({
            "test_duration_secs": self.start_time.elapsed().as_secs_f64(),
            "aggregated_stats": stats,
            "games": self.games,
        });

        let json_string = serde_json::to_string_pretty(&output)?;
        let mut file = File::create(path)?;
        file.write_all(json_string.as_bytes())?;

        Ok(())
    }
}

fn percentile(sorted_data: &[u64], percentile: f64) -> u64 {
    if sorted_data.is_empty() {
        return 0;
    }

    let index = (percentile / 100.0 * (sorted_data.len() - 1) as f64).round() as usize;
    sorted_data[index.min(sorted_data.len() - 1)]
}
