// src/interception/connection_interceptor.rs
//! Process-wide connection interceptor
//!
//! Holds the currently active `BlockConfiguration` (if any) and a stack of
//! the configurations it replaced. Every guarded connection attempt consults
//! it through `on_connect_attempt`.
//!
//! The state is global: sessions entered from different threads are not
//! isolated from each other. Callers serialize sessions (one test at a time),
//! or use `GuardedConnector::with_policy` to pass a policy explicitly.

use crate::interception::address_matcher::{matches, BlockConfiguration, MatchResult};
use crate::observability;
use crate::utils::errors::{BlockedConnectionError, BlockedHostError, BlockedPortError};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

static INTERCEPTOR: Lazy<Mutex<InterceptorState>> =
    Lazy::new(|| Mutex::new(InterceptorState::default()));

static BASELINE: OnceCell<()> = OnceCell::new();

#[derive(Default)]
struct InterceptorState {
    /// Policy consulted by connection attempts; `None` is the baseline
    active: Option<Arc<BlockConfiguration>>,

    /// Policies replaced by open sessions, innermost last
    saved: Vec<SavedPolicy>,

    next_session_id: u64,
}

struct SavedPolicy {
    session_id: u64,
    previous: Option<Arc<BlockConfiguration>>,
}

/// How the wrapped connect call reports failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMode {
    /// `connect`: failures are returned as errors
    Raising,

    /// `connect_ex`: ordinary failures become a status code
    StatusCode,
}

impl ConnectMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectMode::Raising => "connect",
            ConnectMode::StatusCode => "connect_ex",
        }
    }
}

/// Decision for a single connection attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Perform the real connection
    Proceed,

    /// Refuse the attempt with this error
    Blocked(BlockedConnectionError),
}

impl Outcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Outcome::Blocked(_))
    }

    /// `Ok(())` to proceed, the blocking error otherwise
    pub fn into_result(self) -> Result<(), BlockedConnectionError> {
        match self {
            Outcome::Proceed => Ok(()),
            Outcome::Blocked(err) => Err(err),
        }
    }
}

/// Token for one `enter_session` call, consumed by `exit_session`
#[derive(Debug)]
#[must_use = "a session stays active until its handle is passed to exit_session"]
pub struct SessionHandle {
    id: u64,
}

impl SessionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Establish the unmodified connection behavior as the baseline.
///
/// The baseline is "no active policy": guarded connectors consult the
/// interceptor on every attempt, so there is nothing to patch and this only
/// marks the interceptor as installed. Idempotent; sessions still work
/// without calling it first.
pub fn install_default() {
    BASELINE.get_or_init(|| {
        let state = INTERCEPTOR.lock();
        if state.active.is_some() {
            warn!("Baseline installed while a session is active");
        }
        info!("Connection interceptor installed");
    });
}

/// Make `config` the active policy until the handle is exited.
///
/// Nested sessions replace the outer policy entirely for their scope.
pub fn enter_session(config: BlockConfiguration) -> SessionHandle {
    let mut state = INTERCEPTOR.lock();

    state.next_session_id += 1;
    let id = state.next_session_id;

    if state.active.is_some() {
        warn!(
            "Session {} entered while another session is active; outer policy suspended",
            id
        );
    }

    info!(
        "Entering interception session {} ({} hosts, {} ports blocked)",
        id,
        config.blocked_hosts().count(),
        config.blocked_ports().count()
    );

    let previous = state.active.replace(Arc::new(config));
    state.saved.push(SavedPolicy {
        session_id: id,
        previous,
    });

    SessionHandle { id }
}

/// Restore the policy that was active before `handle` was entered.
///
/// # Panics
///
/// Panics if `handle` is not the innermost open session.
pub fn exit_session(handle: SessionHandle) {
    let mut state = INTERCEPTOR.lock();

    let top = state.saved.last().map(|saved| saved.session_id);
    assert_eq!(
        top,
        Some(handle.id),
        "interception session {} exited out of order (innermost open session: {:?})",
        handle.id,
        top
    );

    if let Some(saved) = state.saved.pop() {
        state.active = saved.previous;
    }

    info!("Exited interception session {}", handle.id);
}

/// Whether any session is currently active
pub fn is_active() -> bool {
    INTERCEPTOR.lock().active.is_some()
}

/// Number of open (possibly nested) sessions
pub fn depth() -> usize {
    INTERCEPTOR.lock().saved.len()
}

/// Snapshot of the active policy
pub fn active_configuration() -> Option<Arc<BlockConfiguration>> {
    INTERCEPTOR.lock().active.clone()
}

/// Decide a connection attempt against the process-wide policy
pub fn on_connect_attempt(host: &str, port: u16, mode: ConnectMode) -> Outcome {
    let active = active_configuration();
    decide(host, port, mode, active.as_deref())
}

/// Decide a connection attempt against an explicit policy.
///
/// `None` means no session: the attempt always proceeds.
pub fn decide(
    host: &str,
    port: u16,
    mode: ConnectMode,
    policy: Option<&BlockConfiguration>,
) -> Outcome {
    observability::record_attempt(mode);

    let Some(config) = policy else {
        debug!("{} {}:{} proceeds (no session)", mode.as_str(), host, port);
        return Outcome::Proceed;
    };

    let blocked: BlockedConnectionError = match matches(host, port, config) {
        MatchResult::NoMatch => {
            debug!("{} {}:{} proceeds (no match)", mode.as_str(), host, port);
            return Outcome::Proceed;
        }
        MatchResult::HostBlocked => BlockedHostError {
            host: host.to_string(),
            port,
        }
        .into(),
        MatchResult::PortBlocked => BlockedPortError {
            host: host.to_string(),
            port,
        }
        .into(),
    };

    warn!(
        "Blocked {} to {}:{} ({} rule)",
        mode.as_str(),
        host,
        port,
        blocked.rule()
    );
    observability::record_blocked(&blocked);

    Outcome::Blocked(blocked)
}
