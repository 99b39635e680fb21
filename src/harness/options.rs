// src/harness/options.rs
//! Command-line options for offline test runs
//!
//! `--block-host` and `--block-port` may be repeated; every value lands in
//! the run-wide block configuration.

use crate::interception::BlockConfiguration;
use crate::utils::config::OfflineConfig;
use crate::utils::errors::{OfflineError, Result};
use clap::{ArgAction, Args, Parser};

/// Block-list options, flattened into a test runner's own CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct OfflineOptions {
    /// Block connections to HOST (name or IP literal). Can be specified multiple times.
    #[arg(long = "block-host", value_name = "HOST", action = ArgAction::Append)]
    pub block_hosts: Vec<String>,

    /// Block connections to PORT. Can be specified multiple times.
    #[arg(
        long = "block-port",
        value_name = "PORT",
        action = ArgAction::Append,
        value_parser = parse_port
    )]
    pub block_ports: Vec<u16>,
}

#[derive(Debug, Parser)]
#[command(no_binary_name = true)]
struct OptionsOnly {
    #[command(flatten)]
    options: OfflineOptions,
}

impl OfflineOptions {
    /// Parse options from raw arguments (without a binary name)
    pub fn try_parse_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        OptionsOnly::try_parse_from(args)
            .map(|parsed| parsed.options)
            .map_err(|e| OfflineError::ConfigError(e.to_string()))
    }

    /// Add the hosts and ports from file/env configuration
    pub fn merge_config(mut self, config: &OfflineConfig) -> Self {
        for host in &config.block_hosts {
            if !self.block_hosts.contains(host) {
                self.block_hosts.push(host.clone());
            }
        }
        for port in &config.block_ports {
            if !self.block_ports.contains(port) {
                self.block_ports.push(*port);
            }
        }
        self
    }

    pub fn to_block_configuration(&self) -> BlockConfiguration {
        BlockConfiguration::new(self.block_hosts.iter().cloned(), self.block_ports.iter().copied())
    }
}

/// Parse a port number in 0..=65535
pub fn parse_port(value: &str) -> Result<u16> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|_| OfflineError::InvalidPort(value.to_string()))
}
