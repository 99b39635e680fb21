// src/interception/session.rs
//! Scoped interception sessions
//!
//! A `SessionGuard` keeps a block configuration active until it is dropped,
//! so the previous policy comes back on every exit path: normal return,
//! early `?` return, or panic unwinding.
//!
//! ```rust,ignore
//! let _guard = block_hosts(["127.0.0.1"]);
//! let err = GuardedConnector::new().connect("127.0.0.1", 8000).unwrap_err();
//! assert!(err.is_blocked());
//! ```

use crate::interception::address_matcher::BlockConfiguration;
use crate::interception::connection_interceptor::{self, SessionHandle};

/// Active interception session; exits when dropped
#[derive(Debug)]
#[must_use = "the session ends as soon as the guard is dropped"]
pub struct SessionGuard {
    handle: Option<SessionHandle>,
}

impl SessionGuard {
    /// Enter a session for `config`
    pub fn enter(config: BlockConfiguration) -> Self {
        Self {
            handle: Some(connection_interceptor::enter_session(config)),
        }
    }

    /// End the session now instead of at scope exit
    pub fn exit(mut self) {
        if let Some(handle) = self.handle.take() {
            connection_interceptor::exit_session(handle);
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            connection_interceptor::exit_session(handle);
        }
    }
}

/// Block every connection to the given hosts while the guard lives
pub fn block_hosts<H, S>(hosts: H) -> SessionGuard
where
    H: IntoIterator<Item = S>,
    S: Into<String>,
{
    SessionGuard::enter(BlockConfiguration::hosts(hosts))
}

/// Block every connection to the given ports while the guard lives
pub fn block_ports<P>(ports: P) -> SessionGuard
where
    P: IntoIterator<Item = u16>,
{
    SessionGuard::enter(BlockConfiguration::ports(ports))
}

/// Activate `config` while the guard lives
pub fn block(config: BlockConfiguration) -> SessionGuard {
    SessionGuard::enter(config)
}

/// Run `body` with `config` active
pub fn with_blocked<F, R>(config: BlockConfiguration, body: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = SessionGuard::enter(config);
    body()
}
