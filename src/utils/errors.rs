// src/utils/errors.rs
//! Error types for connection interception
//!
//! Error families:
//!
//! - **Blocked errors**: `BlockedHostError` / `BlockedPortError`, raised when
//!   an active session matches a connection attempt
//! - **Connect errors**: what the guarded connectors hand back, separating a
//!   block from the natural failure of a permitted connection
//! - **OfflineError**: configuration and option problems

use std::io;
use thiserror::Error;

/// A connection was refused because its host is on the block list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{host}:{port} connection was blocked")]
pub struct BlockedHostError {
    pub host: String,
    pub port: u16,
}

/// A connection was refused because its port is on the block list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{host}:{port} connection was blocked")]
pub struct BlockedPortError {
    pub host: String,
    pub port: u16,
}

/// Which blocking rule fired for a connection attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockedConnectionError {
    #[error(transparent)]
    Host(#[from] BlockedHostError),

    #[error(transparent)]
    Port(#[from] BlockedPortError),
}

impl BlockedConnectionError {
    /// Host exactly as it was handed to the connector
    pub fn host(&self) -> &str {
        match self {
            Self::Host(e) => &e.host,
            Self::Port(e) => &e.host,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            Self::Host(e) => e.port,
            Self::Port(e) => e.port,
        }
    }

    /// Short rule name, used as a metrics label
    pub fn rule(&self) -> &'static str {
        match self {
            Self::Host(_) => "host",
            Self::Port(_) => "port",
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, Self::Host(_))
    }

    pub fn is_port(&self) -> bool {
        matches!(self, Self::Port(_))
    }
}

/// Failure of a guarded connection attempt
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The active policy refused the attempt before any network I/O
    #[error(transparent)]
    Blocked(#[from] BlockedConnectionError),

    /// Name resolution failed for a permitted host
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    /// The permitted connection failed on its own (refused, unreachable, ...)
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ConnectError {
    /// The blocking error, if this failure came from the policy
    pub fn as_blocked(&self) -> Option<&BlockedConnectionError> {
        match self {
            Self::Blocked(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.as_blocked().is_some()
    }
}

impl From<BlockedHostError> for ConnectError {
    fn from(err: BlockedHostError) -> Self {
        Self::Blocked(err.into())
    }
}

impl From<BlockedPortError> for ConnectError {
    fn from(err: BlockedPortError) -> Self {
        Self::Blocked(err.into())
    }
}

impl From<ConnectError> for io::Error {
    fn from(err: ConnectError) -> Self {
        match err {
            ConnectError::Blocked(blocked) => io::Error::new(io::ErrorKind::PermissionDenied, blocked),
            ConnectError::Resolve { source, .. } => source,
            ConnectError::Io(e) => e,
        }
    }
}

/// Recover the blocking error from an `io::Error` produced by a guarded connector
pub fn blocked_error(err: &io::Error) -> Option<&BlockedConnectionError> {
    err.get_ref()
        .and_then(|inner| inner.downcast_ref::<BlockedConnectionError>())
}

/// Crate-level errors (configuration, options)
#[derive(Debug, Error)]
pub enum OfflineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),
}

pub type Result<T> = std::result::Result<T, OfflineError>;
