// src/interception/mod.rs
//! Connection interception layer
//!
//! Keeps test code offline by deciding every outbound stream connection
//! before it reaches the network:
//!
//! - **Address Matcher**: exact host / port matching against a block list
//! - **Connection Interceptor**: process-wide policy with stack-disciplined
//!   sessions and the shared per-attempt decision
//! - **Session**: RAII guards that activate a block list for a scope
//! - **Connector**: the seam code under test connects through
//!
//! # Architecture
//!
//! ```text
//! Code under test
//!     │
//!     ├─ connect(host, port)    ─┐
//!     └─ connect_ex(host, port) ─┴─→ GuardedConnector
//!                                        │
//!                                 on_connect_attempt ←── active session
//!                                        │                (SessionGuard)
//!                         ┌──────────────┴──────────────┐
//!                      Blocked                        Proceed
//!                 BlockedHostError /              DirectConnector
//!                 BlockedPortError                (real network)
//! ```

pub mod address_matcher;
pub mod connection_interceptor;
pub mod connector;
pub mod session;

// Re-export commonly used types
pub use address_matcher::{matches, BlockConfiguration, MatchResult};
pub use connection_interceptor::{
    decide, enter_session, exit_session, install_default, on_connect_attempt, ConnectMode,
    Outcome, SessionHandle,
};
pub use connector::{ConnectStatus, Connector, DirectConnector, GuardedConnector};
pub use session::{block, block_hosts, block_ports, with_blocked, SessionGuard};
