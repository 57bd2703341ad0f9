mod env;
pub use env::apply_env_overrides;

use serde::Deserialize;
use std::path::PathBuf;

/// Complete crowdwatch configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrowdwatchConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Occupancy simulator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between ticks
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// Seconds before the first tick after startup
    #[serde(default = "default_initial_delay_seconds")]
    pub initial_delay_seconds: u64,
    /// Fixed seed for reproducible runs; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn default_interval_seconds() -> u64 {
    10
}

fn default_initial_delay_seconds() -> u64 {
    2
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_seconds: default_interval_seconds(),
            initial_delay_seconds: default_initial_delay_seconds(),
            seed: None,
        }
    }
}

/// Video upload and analysis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Simulated analysis latency
    #[serde(default = "default_processing_delay_ms")]
    pub processing_delay_ms: u64,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_bytes() -> u64 {
    crate::media::DEFAULT_MAX_UPLOAD_BYTES
}

fn default_processing_delay_ms() -> u64 {
    2000
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            processing_delay_ms: default_processing_delay_ms(),
        }
    }
}

/// Chat assistant configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// History entries returned when no limit is given
    #[serde(default = "default_history_limit")]
    pub history_default_limit: usize,
    /// Upper bound on a requested history limit
    #[serde(default = "default_history_max_limit")]
    pub history_max_limit: usize,
    /// Seed for reply phrasing; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_history_limit() -> usize {
    20
}

fn default_history_max_limit() -> usize {
    200
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_default_limit: default_history_limit(),
            history_max_limit: default_history_max_limit(),
            seed: None,
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<CrowdwatchConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: CrowdwatchConfig = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CrowdwatchConfig::default();
        assert_eq!(config.server.port, 5000);
        assert!(config.simulation.enabled);
        assert_eq!(config.simulation.interval_seconds, 10);
        assert_eq!(config.simulation.initial_delay_seconds, 2);
        assert_eq!(config.media.max_upload_bytes, 500 * 1024 * 1024);
        assert_eq!(config.media.processing_delay_ms, 2000);
        assert_eq!(config.chat.history_default_limit, 20);
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [server]
            bind_address = "127.0.0.1"
            port = 8080

            [simulation]
            enabled = false
            interval_seconds = 5
            initial_delay_seconds = 0
            seed = 7

            [media]
            upload_dir = "/tmp/crowdwatch"
            max_upload_bytes = 1024
            processing_delay_ms = 10

            [chat]
            history_default_limit = 5
            history_max_limit = 50
        "#;

        let config: CrowdwatchConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert!(!config.simulation.enabled);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.media.upload_dir, PathBuf::from("/tmp/crowdwatch"));
        assert_eq!(config.media.max_upload_bytes, 1024);
        assert_eq!(config.chat.history_max_limit, 50);
    }

    #[test]
    fn test_partial_config() {
        // Missing sections and keys use defaults
        let toml = r#"
            [simulation]
            interval_seconds = 3
        "#;

        let config: CrowdwatchConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.simulation.interval_seconds, 3);
        assert!(config.simulation.enabled);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.media.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crowdwatch.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("/nonexistent/crowdwatch.toml").is_err());
    }
}
