// src/interception/connector.rs
//! Connector seam for outbound stream connections
//!
//! Code under test takes a `Connector` instead of calling
//! `TcpStream::connect` directly. Production wiring hands it a
//! `DirectConnector`; tests hand it a `GuardedConnector`, which routes every
//! attempt through the interceptor before any resolution or socket I/O.
//!
//! Two call styles share one decision:
//!
//! - `connect`: every failure is an `Err`
//! - `connect_ex`: a refused or unreachable connection comes back as a
//!   nonzero status; a blocked attempt is still an `Err`

use crate::interception::address_matcher::BlockConfiguration;
use crate::interception::connection_interceptor::{self, ConnectMode, Outcome};
use crate::utils::errors::ConnectError;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Substitution point for outbound stream connections
pub trait Connector: Send + Sync {
    /// Resolve `host` (name or IP literal) to socket addresses
    fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>>;

    /// Connect to one resolved address
    fn connect_addr(&self, addr: &SocketAddr) -> io::Result<TcpStream>;

    /// Resolve and connect, trying each address in order
    fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        let addrs = self.resolve(host, port)?;
        connect_first(self, &addrs)
    }
}

fn connect_first<C: Connector + ?Sized>(connector: &C, addrs: &[SocketAddr]) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in addrs {
        match connector.connect_addr(addr) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "could not resolve to any address")
    }))
}

/// Real network connector
#[derive(Debug, Clone, Default)]
pub struct DirectConnector {
    timeout: Option<Duration>,
}

impl DirectConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Connector for DirectConnector {
    fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
        Ok((host, port).to_socket_addrs()?.collect())
    }

    fn connect_addr(&self, addr: &SocketAddr) -> io::Result<TcpStream> {
        match self.timeout {
            Some(timeout) => TcpStream::connect_timeout(addr, timeout),
            None => TcpStream::connect(addr),
        }
    }
}

/// Result of a status-code style connect
#[derive(Debug)]
pub enum ConnectStatus {
    Connected(TcpStream),
    Failed(io::Error),
}

impl ConnectStatus {
    /// 0 on success, the OS error code (or -1) otherwise
    pub fn code(&self) -> i32 {
        match self {
            ConnectStatus::Connected(_) => 0,
            ConnectStatus::Failed(e) => e.raw_os_error().filter(|c| *c != 0).unwrap_or(-1),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectStatus::Connected(_))
    }

    pub fn into_stream(self) -> Option<TcpStream> {
        match self {
            ConnectStatus::Connected(stream) => Some(stream),
            ConnectStatus::Failed(_) => None,
        }
    }
}

/// Where a guarded connector takes its policy from
#[derive(Debug, Clone)]
enum Policy {
    /// The process-wide session state
    Session,

    /// A policy carried by this connector alone
    Fixed(Arc<BlockConfiguration>),
}

/// Connector that consults the interceptor before touching the network
#[derive(Debug, Clone)]
pub struct GuardedConnector<C = DirectConnector> {
    inner: C,
    policy: Policy,
}

impl GuardedConnector<DirectConnector> {
    /// Guard real connections with the process-wide session policy
    pub fn new() -> Self {
        Self::wrap(DirectConnector::new())
    }

    /// Guard real connections with an explicit policy, ignoring sessions
    pub fn with_policy(config: BlockConfiguration) -> Self {
        Self::wrap(DirectConnector::new()).fixed(config)
    }
}

impl Default for GuardedConnector<DirectConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> GuardedConnector<C> {
    /// Guard an arbitrary connector with the process-wide session policy
    pub fn wrap(inner: C) -> Self {
        Self {
            inner,
            policy: Policy::Session,
        }
    }

    /// Switch to an explicit policy
    pub fn fixed(mut self, config: BlockConfiguration) -> Self {
        self.policy = Policy::Fixed(Arc::new(config));
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn check(&self, host: &str, port: u16, mode: ConnectMode) -> Outcome {
        match &self.policy {
            Policy::Session => connection_interceptor::on_connect_attempt(host, port, mode),
            Policy::Fixed(config) => connection_interceptor::decide(host, port, mode, Some(config)),
        }
    }

    fn resolve_checked(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>, ConnectError> {
        self.inner
            .resolve(host, port)
            .map_err(|source| ConnectError::Resolve {
                host: host.to_string(),
                source,
            })
    }

    /// Raising-style connect
    pub fn connect(&self, host: &str, port: u16) -> Result<TcpStream, ConnectError> {
        self.check(host, port, ConnectMode::Raising).into_result()?;

        let addrs = self.resolve_checked(host, port)?;
        let stream = connect_first(&self.inner, &addrs)?;
        debug!("Connected to {}:{}", host, port);
        Ok(stream)
    }

    /// Status-code style connect.
    ///
    /// Blocked attempts and resolution failures are still errors; a failed
    /// connection to a permitted address is `Ok(ConnectStatus::Failed)`.
    pub fn connect_ex(&self, host: &str, port: u16) -> Result<ConnectStatus, ConnectError> {
        self.check(host, port, ConnectMode::StatusCode).into_result()?;

        let addrs = self.resolve_checked(host, port)?;
        match connect_first(&self.inner, &addrs) {
            Ok(stream) => Ok(ConnectStatus::Connected(stream)),
            Err(e) => {
                debug!("connect_ex {}:{} failed: {}", host, port, e);
                Ok(ConnectStatus::Failed(e))
            }
        }
    }

    /// Raising-style connect to a socket address; the host is its IP literal
    pub fn connect_socket_addr(&self, addr: SocketAddr) -> Result<TcpStream, ConnectError> {
        let host = addr.ip().to_string();
        self.check(&host, addr.port(), ConnectMode::Raising).into_result()?;
        Ok(self.inner.connect_addr(&addr)?)
    }

    /// Async raising-style connect using tokio's resolver and sockets
    pub async fn connect_async(
        &self,
        host: &str,
        port: u16,
    ) -> Result<tokio::net::TcpStream, ConnectError> {
        self.check(host, port, ConnectMode::Raising).into_result()?;

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
            .await
            .map_err(|source| ConnectError::Resolve {
                host: host.to_string(),
                source,
            })?
            .collect();

        let mut last_err = None;
        for addr in addrs {
            match tokio::net::TcpStream::connect(addr).await {
                Ok(stream) => {
                    debug!("Connected to {}:{} via {}", host, port, addr);
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }

        Err(ConnectError::Io(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "could not resolve to any address")
        })))
    }
}

impl<C: Connector> Connector for GuardedConnector<C> {
    fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
        self.inner.resolve(host, port)
    }

    fn connect_addr(&self, addr: &SocketAddr) -> io::Result<TcpStream> {
        Ok(self.connect_socket_addr(*addr)?)
    }

    fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        Ok(GuardedConnector::connect(self, host, port)?)
    }
}
