// src/harness/runner.rs
//! Test runner glue
//!
//! Applies the run-wide block configuration around each test body, or a
//! per-test override in its place. Sessions are restored even when the body
//! panics, so one failing test cannot leave the process blocked.

use crate::harness::options::OfflineOptions;
use crate::interception::{self, BlockConfiguration, SessionGuard};
use crate::utils::config::OfflineConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, info_span};

/// Runs test bodies inside interception sessions
pub struct TestHarness {
    run_config: BlockConfiguration,
    tests_run: AtomicU64,
}

impl TestHarness {
    /// Create a harness that applies `run_config` to every test
    pub fn new(run_config: BlockConfiguration) -> Self {
        interception::install_default();

        info!(
            "Offline harness ready ({} hosts, {} ports blocked for the run)",
            run_config.blocked_hosts().count(),
            run_config.blocked_ports().count()
        );

        Self {
            run_config,
            tests_run: AtomicU64::new(0),
        }
    }

    /// Build from CLI options merged with file/env configuration
    pub fn from_options(options: OfflineOptions, config: &OfflineConfig) -> Self {
        Self::new(options.merge_config(config).to_block_configuration())
    }

    pub fn run_config(&self) -> &BlockConfiguration {
        &self.run_config
    }

    pub fn tests_run(&self) -> u64 {
        self.tests_run.load(Ordering::Relaxed)
    }

    /// Run `body` under the run-wide configuration
    pub fn run<F, R>(&self, name: &str, body: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.run_with(name, None, body)
    }

    /// Run `body` under `override_config` if given, else the run-wide one
    pub fn run_with<F, R>(
        &self,
        name: &str,
        override_config: Option<BlockConfiguration>,
        body: F,
    ) -> R
    where
        F: FnOnce() -> R,
    {
        let span = info_span!("offline_test", test = name);
        let _entered = span.enter();

        let config = match override_config {
            Some(config) => {
                debug!("Using per-test block configuration");
                config
            }
            None => self.run_config.clone(),
        };

        self.tests_run.fetch_add(1, Ordering::Relaxed);
        let _session = SessionGuard::enter(config);
        body()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new(BlockConfiguration::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interception::connection_interceptor::is_active;
    use crate::interception::{on_connect_attempt, ConnectMode};
    use serial_test::serial;

    fn blocked(host: &str, port: u16) -> bool {
        on_connect_attempt(host, port, ConnectMode::Raising).is_blocked()
    }

    #[test]
    #[serial]
    fn test_default_harness_blocks_nothing() {
        let harness = TestHarness::default();
        let result = harness.run("default", || blocked("127.0.0.1", 8000));
        assert!(!result);
        assert_eq!(harness.tests_run(), 1);
    }

    #[test]
    #[serial]
    fn test_run_wide_configuration() {
        let options = OfflineOptions::try_parse_args(["--block-host", "127.0.0.1"]).unwrap();
        let harness = TestHarness::from_options(options, &OfflineConfig::default());

        assert!(harness.run("ip", || blocked("127.0.0.1", 8000)));
        assert!(!harness.run("hostname", || blocked("localhost", 8000)));
        assert!(!is_active());
    }

    #[test]
    #[serial]
    fn test_per_test_override_replaces_run_config() {
        let harness = TestHarness::new(BlockConfiguration::ports([8000]));

        let (port_8000, port_8001) = harness.run_with(
            "override",
            Some(BlockConfiguration::ports([8001])),
            || (blocked("127.0.0.1", 8000), blocked("127.0.0.1", 8001)),
        );
        assert!(!port_8000);
        assert!(port_8001);

        assert!(harness.run("run-wide", || blocked("127.0.0.1", 8000)));
    }

    #[test]
    #[serial]
    fn test_failing_test_does_not_leak_session() {
        let harness = TestHarness::new(BlockConfiguration::hosts(["localhost"]));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            harness.run("panics", || panic!("assertion failed in test body"))
        }));
        assert!(result.is_err());
        assert!(!is_active());
        assert!(!blocked("localhost", 8000));
    }
}
