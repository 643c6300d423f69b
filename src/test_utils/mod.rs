//! Test utilities for the SDK
//!
//! Helpers shared by unit tests and the integration suite (enable the
//! `test-utils` feature from outside the crate):
//!
//! - [`init_test_logging`] - route `tracing` output to the test writer
//! - [`MockContentSource`] - in-memory repository files with failure injection,
//!   latency and call counters
//! - [`StaticSourceResolver`] - fixed per-location content sources
//! - [`ManifestFixture`] - plugin manifests for fetcher and enricher tests
//!
//! # Example
//!
//! ```rust,no_run
//! use uos_plugin_sdk::constants::CONFIG_PROD_FULL_PATH;
//! use uos_plugin_sdk::test_utils::MockContentSource;
//!
//! let source = MockContentSource::new()
//!     .with_file("acme", "demo", CONFIG_PROD_FULL_PATH, "plugins: {}\n")
//!     .with_failure("acme", ".ubiquity-os", CONFIG_PROD_FULL_PATH, 500);
//! assert_eq!(source.call_count(), 0);
//! ```

pub mod content;
pub mod fixtures;

pub use content::{MockContentSource, StaticSourceResolver};
pub use fixtures::ManifestFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests run without log output.
///
/// ```bash
/// RUST_LOG=uos_plugin_sdk=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
