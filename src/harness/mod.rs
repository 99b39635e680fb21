// src/harness/mod.rs
//! Test-runner glue
//!
//! Turns `--block-host` / `--block-port` options (plus file and environment
//! configuration) into a run-wide block configuration, and wraps each test
//! body in an interception session.

pub mod options;
pub mod runner;

pub use options::{parse_port, OfflineOptions};
pub use runner::TestHarness;
