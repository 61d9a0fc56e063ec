//! # Configuration
//!
//! Tunables shared by the server and the client harness, loaded from an
//! optional TOML file. Every field has a default, so an empty file (or no file
//! at all) gives a working setup.
//!
//! ```toml
//! [server]
//! read_timeout_secs = 30
//! shutdown_grace_secs = 5
//!
//! [clients]
//! max_in_flight = 1000
//! connect_timeout_secs = 10
//! read_timeout_secs = 30
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Example
/// ```ignore
/// let config: WarConfig = load_config("config/war.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Converts a seconds setting into a timeout; `0` disables it.
fn secs(value: u64) -> Option<Duration> {
    (value > 0).then(|| Duration::from_secs(value))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WarConfig {
    pub server: ServerSettings,
    pub clients: ClientSettings,
}

/// Matchmaker and session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bound on each frame read from a player (seconds, 0 = unbounded)
    pub read_timeout_secs: u64,
    /// How long running sessions may keep going after shutdown is requested
    pub shutdown_grace_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            read_timeout_secs: 30,
            shutdown_grace_secs: 5,
        }
    }
}

impl ServerSettings {
    pub fn read_timeout(&self) -> Option<Duration> {
        secs(self.read_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Client agent and limiter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Ceiling on agents in flight at once
    pub max_in_flight: usize,
    /// Bound on establishing the TCP connection (seconds, 0 = unbounded)
    pub connect_timeout_secs: u64,
    /// Bound on each frame read from the server (seconds, 0 = unbounded)
    pub read_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            max_in_flight: 1000,
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
        }
    }
}

impl ClientSettings {
    pub fn connect_timeout(&self) -> Option<Duration> {
        secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        secs(self.read_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = WarConfig::default();
        assert_eq!(config.clients.max_in_flight, 1000);
        assert_eq!(config.server.read_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.server.shutdown_grace(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[clients]\nmax_in_flight = 8\nread_timeout_secs = 0").unwrap();

        let config: WarConfig = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.clients.max_in_flight, 8);
        assert_eq!(config.clients.read_timeout(), None);
        assert_eq!(config.clients.connect_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.server.read_timeout_secs, 30);
    }

    #[test]
    fn test_example_config_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/war.toml");
        let config: WarConfig = load_config(path).unwrap();
        assert_eq!(config.clients.max_in_flight, 1000);
        assert_eq!(config.server.shutdown_grace_secs, 5);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config::<WarConfig>("/nonexistent/war.toml").is_err());
    }
}
