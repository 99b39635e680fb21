// src/lib.rs
//! Sentra Lab Offline
//!
//! Keeps test suites from making real outbound connections. Connection
//! attempts go through a guarded connector that checks the active block list
//! and fails blocked attempts with a typed error before any network I/O.
//!
//! # Architecture
//!
//! - **interception**: address matching, the process-wide interceptor,
//!   scoped sessions and the connector seam
//! - **harness**: `--block-host` / `--block-port` options and per-test
//!   session wiring
//! - **observability**: tracing subscriber setup and metrics counters
//! - **utils**: configuration loading and error types
//!
//! # Example
//!
//! ```rust,ignore
//! use sentra_offline::{block_hosts, GuardedConnector};
//!
//! let connector = GuardedConnector::new();
//! let _session = block_hosts(["127.0.0.1"]);
//!
//! let err = connector.connect("127.0.0.1", 8000).unwrap_err();
//! assert_eq!(err.to_string(), "127.0.0.1:8000 connection was blocked");
//! ```

// Public module exports
pub mod harness;
pub mod interception;
pub mod observability;
pub mod utils;

// Re-export commonly used types
pub use harness::{OfflineOptions, TestHarness};
pub use interception::{
    block, block_hosts, block_ports, with_blocked, BlockConfiguration, ConnectMode, ConnectStatus,
    Connector, DirectConnector, GuardedConnector, MatchResult, Outcome, SessionGuard,
};
pub use utils::config::OfflineConfig;
pub use utils::errors::{
    blocked_error, BlockedConnectionError, BlockedHostError, BlockedPortError, ConnectError,
    OfflineError, Result,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
