// src/utils/mod.rs
//! Shared configuration and error types

pub mod config;
pub mod errors;

pub use config::OfflineConfig;
pub use errors::{
    BlockedConnectionError, BlockedHostError, BlockedPortError, ConnectError, OfflineError, Result,
};
