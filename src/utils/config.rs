// src/utils/config.rs
//! Configuration loading
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. `sentra-offline.{toml,yaml,json}` in the working directory (optional)
//! 2. `SENTRA_OFFLINE_*` environment variables
//!
//! List values from the environment are comma separated, e.g.
//! `SENTRA_OFFLINE_BLOCK_HOSTS=localhost,127.0.0.1`.

use crate::interception::BlockConfiguration;
use crate::utils::errors::{OfflineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Base name of the optional config file
pub const CONFIG_FILE_STEM: &str = "sentra-offline";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SENTRA_OFFLINE";

/// Run-wide offline configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineConfig {
    /// Hosts (names or IP literals) to block for the whole run
    pub block_hosts: Vec<String>,

    /// Ports to block for the whole run
    pub block_ports: Vec<u16>,

    /// Emit logs as JSON
    pub log_json: bool,
}

impl OfflineConfig {
    /// Load from the default file (if present) and the environment
    pub fn load() -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE_STEM).required(false));

        Self::finish(builder)
    }

    /// Load from an explicit file, still honoring the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(OfflineError::ConfigError(format!(
                "Config file not found: {:?}",
                path
            )));
        }

        let builder = config::Config::builder().add_source(config::File::from(path));

        Self::finish(builder)
    }

    fn finish(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .list_separator(",")
                    .with_list_parse_key("block_hosts")
                    .with_list_parse_key("block_ports"),
            )
            .build()
            .map_err(|e| OfflineError::ConfigError(e.to_string()))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| OfflineError::ConfigError(e.to_string()))?;

        debug!(
            "Loaded offline config: {} hosts, {} ports",
            config.block_hosts.len(),
            config.block_ports.len()
        );

        Ok(config)
    }

    /// Build the block configuration this config describes
    pub fn block_configuration(&self) -> BlockConfiguration {
        BlockConfiguration::new(self.block_hosts.iter().cloned(), self.block_ports.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_default_blocks_nothing() {
        let config = OfflineConfig::default();
        assert!(config.block_configuration().is_empty());
        assert!(!config.log_json);
    }

    #[test]
    #[serial]
    fn test_load_from_toml() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "block_hosts = [\"localhost\", \"127.0.0.1\"]\nblock_ports = [8000]\nlog_json = true"
        )
        .unwrap();

        let config = OfflineConfig::load_from(file.path()).unwrap();
        assert_eq!(config.block_hosts, vec!["localhost", "127.0.0.1"]);
        assert_eq!(config.block_ports, vec![8000]);
        assert!(config.log_json);

        let block = config.block_configuration();
        assert!(block.blocks_host("localhost"));
        assert!(block.blocks_port(8000));
    }

    /// Run `body` with the given `SENTRA_OFFLINE_*` variables set
    fn with_env<R>(vars: &[(&str, &str)], body: impl FnOnce() -> R) -> R {
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let result = body();
        for (key, _) in vars {
            std::env::remove_var(key);
        }
        result
    }

    #[test]
    #[serial]
    fn test_env_single_port_and_host() {
        let config = with_env(
            &[
                ("SENTRA_OFFLINE_BLOCK_PORTS", "8000"),
                ("SENTRA_OFFLINE_BLOCK_HOSTS", "localhost"),
            ],
            OfflineConfig::load,
        )
        .unwrap();

        assert_eq!(config.block_ports, vec![8000]);
        assert_eq!(config.block_hosts, vec!["localhost"]);
    }

    #[test]
    #[serial]
    fn test_env_multiple_ports_and_hosts() {
        let config = with_env(
            &[
                ("SENTRA_OFFLINE_BLOCK_PORTS", "8000,8001"),
                ("SENTRA_OFFLINE_BLOCK_HOSTS", "localhost,127.0.0.1"),
                ("SENTRA_OFFLINE_LOG_JSON", "true"),
            ],
            OfflineConfig::load,
        )
        .unwrap();

        assert_eq!(config.block_ports, vec![8000, 8001]);
        assert_eq!(config.block_hosts, vec!["localhost", "127.0.0.1"]);
        assert!(config.log_json);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "block_ports = [443]").unwrap();

        let config = with_env(&[("SENTRA_OFFLINE_BLOCK_PORTS", "80")], || {
            OfflineConfig::load_from(file.path())
        })
        .unwrap();
        assert_eq!(config.block_ports, vec![80]);
    }

    #[test]
    #[serial]
    fn test_env_invalid_port_rejected() {
        let result = with_env(&[("SENTRA_OFFLINE_BLOCK_PORTS", "8000,http")], OfflineConfig::load);
        assert!(matches!(result, Err(OfflineError::ConfigError(_))));
    }

    #[test]
    #[serial]
    fn test_load_from_missing_file() {
        let result = OfflineConfig::load_from(Path::new("/nonexistent/sentra-offline.toml"));
        assert!(matches!(result, Err(OfflineError::ConfigError(_))));
    }

    #[test]
    #[serial]
    fn test_invalid_port_rejected() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "block_ports = [70000]").unwrap();

        let result = OfflineConfig::load_from(file.path());
        assert!(matches!(result, Err(OfflineError::ConfigError(_))));
    }
}
