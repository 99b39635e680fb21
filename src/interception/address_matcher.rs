// src/interception/address_matcher.rs
//! Address matcher for blocked hosts and ports
//!
//! Matching is exact: host strings are compared as given (no DNS, no
//! canonicalization, no wildcards), ports by value. "localhost", "127.0.0.1"
//! and "::1" are three different entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Hosts and ports to block during an interception session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockConfiguration {
    /// Blocked hostnames or IP literals, case-sensitive
    hosts: BTreeSet<String>,

    /// Blocked ports
    ports: BTreeSet<u16>,
}

impl BlockConfiguration {
    pub fn new<H, S, P>(hosts: H, ports: P) -> Self
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
        P: IntoIterator<Item = u16>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            ports: ports.into_iter().collect(),
        }
    }

    /// Block nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn hosts<H, S>(hosts: H) -> Self
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(hosts, std::iter::empty::<u16>())
    }

    pub fn ports<P>(ports: P) -> Self
    where
        P: IntoIterator<Item = u16>,
    {
        Self::new(Vec::<String>::new(), ports)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.hosts.insert(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.ports.insert(port);
        self
    }

    /// Union of two configurations
    pub fn merged(mut self, other: &BlockConfiguration) -> Self {
        self.hosts.extend(other.hosts.iter().cloned());
        self.ports.extend(other.ports.iter().copied());
        self
    }

    pub fn blocks_host(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }

    pub fn blocks_port(&self, port: u16) -> bool {
        self.ports.contains(&port)
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.ports.is_empty()
    }

    pub fn blocked_hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }

    pub fn blocked_ports(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }
}

/// Which rule, if any, a (host, port) pair hits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    NoMatch,
    HostBlocked,
    PortBlocked,
}

impl MatchResult {
    pub fn is_blocked(&self) -> bool {
        !matches!(self, MatchResult::NoMatch)
    }
}

/// Match a connection destination against a block configuration.
///
/// The host rule is evaluated first, so a pair matching both rules reports
/// `HostBlocked`.
pub fn matches(host: &str, port: u16, config: &BlockConfiguration) -> MatchResult {
    if config.blocks_host(host) {
        MatchResult::HostBlocked
    } else if config.blocks_port(port) {
        MatchResult::PortBlocked
    } else {
        MatchResult::NoMatch
    }
}
