// src/main.rs
//! Sentra Lab Offline CLI
//!
//! Checks or connects to a single destination against a block list built from
//! `--block-host` / `--block-port` plus file and environment configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use sentra_offline::interception::{decide, ConnectMode, Outcome};
use sentra_offline::observability::init_tracing_with;
use sentra_offline::{GuardedConnector, OfflineConfig, OfflineOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "sentra-offline", version, about = "Check connections against an offline block list")]
struct Cli {
    /// Config file (defaults to ./sentra-offline.{toml,yaml,json} if present)
    #[arg(long = "config", short = 'c', value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report whether a connection to HOST:PORT would be blocked
    Check(Target),

    /// Attempt a guarded connection to HOST:PORT and report the outcome
    Connect(Target),
}

#[derive(Debug, clap::Args)]
struct Target {
    #[command(flatten)]
    options: OfflineOptions,

    /// Destination host (name or IP literal)
    host: String,

    /// Destination port
    #[arg(value_parser = sentra_offline::harness::parse_port)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => OfflineConfig::load_from(path)?,
        None => OfflineConfig::load()?,
    };
    init_tracing_with(config.log_json)?;

    info!("Starting Sentra Lab Offline v{}", sentra_offline::VERSION);

    match cli.command {
        Command::Check(target) => check(target, &config),
        Command::Connect(target) => connect(target, &config).await,
    }
}

fn check(target: Target, config: &OfflineConfig) -> Result<ExitCode> {
    let block = target.options.merge_config(config).to_block_configuration();

    match decide(&target.host, target.port, ConnectMode::Raising, Some(&block)) {
        Outcome::Proceed => {
            println!("{}:{} allowed", target.host, target.port);
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Blocked(err) => {
            println!("{} ({} rule)", err, err.rule());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn connect(target: Target, config: &OfflineConfig) -> Result<ExitCode> {
    let block = target.options.merge_config(config).to_block_configuration();
    let connector = GuardedConnector::with_policy(block);

    match connector.connect_async(&target.host, target.port).await {
        Ok(stream) => {
            let peer = stream.peer_addr()?;
            println!("{}:{} connected ({})", target.host, target.port, peer);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_blocked() => {
            println!("{}", err);
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            error!("Connection failed: {}", err);
            println!("{}:{} failed: {}", target.host, target.port, err);
            Ok(ExitCode::from(2))
        }
    }
}
