//! # War Binary Entry Point
//!
//! ```bash
//! war server  --host 127.0.0.1 --port 4444
//! war client  --host 127.0.0.1 --port 4444
//! war clients --host 127.0.0.1 --port 4444 --count 5000 --metrics-output metrics.json
//! ```
//!
//! An optional `--config war.toml` overrides timeouts and the client ceiling.

use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use log::{info, LevelFilter};
use std::io::Write;

use war_game::client::{AgentOutcome, ClientAgent, Limiter};
use war_game::common::config::{load_config, WarConfig};
use war_game::Matchmaker;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML, optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Pair incoming connections and referee their games until Ctrl-C
    Server(Endpoint),
    /// Play a single game
    Client(Endpoint),
    /// Play many games concurrently and report how many completed
    Clients {
        #[command(flatten)]
        endpoint: Endpoint,

        /// Number of games to play
        #[arg(short = 'n', long)]
        count: usize,

        /// Ceiling on games in flight (overrides the config file)
        #[arg(long)]
        max_in_flight: Option<usize>,

        /// Path to write metrics JSON output
        #[arg(long)]
        metrics_output: Option<String>,
    },
}

#[derive(Args, Debug)]
struct Endpoint {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long)]
    port: u16,
}

impl Endpoint {
    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Format: `[HH:MM:SS] [LEVEL] message`, INFO by default, `RUST_LOG` overrides.
fn init_logger() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let cli = Cli::parse();

    let mut config: WarConfig = match &cli.config {
        Some(path) => load_config(path)?,
        None => WarConfig::default(),
    };

    match cli.mode {
        Mode::Server(endpoint) => {
            let matchmaker = Matchmaker::bind(&endpoint.address(), config.server).await?;
            let sessions = matchmaker.run().await?;
            info!("👋 Server stopped after {} sessions", sessions);
        }
        Mode::Client(endpoint) => {
            let agent = ClientAgent::new(endpoint.address(), &config.clients);
            match agent.play().await {
                AgentOutcome::Finished(report) => {
                    info!("Game complete, I {} ({:+})", report.verdict, report.score)
                }
                AgentOutcome::Failed(e) => info!("Game failed: {}", e),
            }
        }
        Mode::Clients {
            endpoint,
            count,
            max_in_flight,
            metrics_output,
        } => {
            if let Some(limit) = max_in_flight {
                config.clients.max_in_flight = limit;
            }
            let agent = ClientAgent::new(endpoint.address(), &config.clients);
            let limiter = Limiter::new(config.clients.max_in_flight);
            let metrics = limiter.run_agents(&agent, count).await;

            let stats = metrics.aggregate();
            info!(
                "📊 {} won, {} lost, {} drew, {} failed",
                stats.won, stats.lost, stats.drew, stats.failed_games
            );

            if let Some(output_path) = metrics_output {
                metrics.export_to_json(&output_path)?;
                info!("Metrics exported to: {}", output_path);
            }
        }
    }

    Ok(())
}
