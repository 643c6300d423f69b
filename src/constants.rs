//! Global constants used throughout the SDK.
//!
//! This module contains well-known repository paths, resolution limits and
//! network timeouts that are shared across multiple modules. Defining them
//! centrally keeps the configuration file layout discoverable in one place.

use std::time::Duration;

/// Production configuration file, relative to the repository root.
pub const CONFIG_PROD_FULL_PATH: &str = ".github/.ubiquity-os.config.yml";

/// Development configuration file, relative to the repository root.
///
/// Also the fail-safe target when an environment name cannot be turned into a
/// usable file suffix.
pub const CONFIG_DEV_FULL_PATH: &str = ".github/.ubiquity-os.config.dev.yml";

/// Directory holding the configuration files inside a repository.
pub const CONFIG_DIR: &str = ".github";

/// File name stem shared by every configuration file variant.
pub const CONFIG_FILE_STEM: &str = ".ubiquity-os.config";

/// Repository under the same owner that carries organization-wide configuration.
pub const CONFIG_ORG_REPO: &str = ".ubiquity-os";

/// Manifest document name, at the plugin repository root or the plugin base URL.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Workflow used when a plugin identifier does not name one.
pub const DEFAULT_WORKFLOW_ID: &str = "compute.yml";

/// Environment name selecting the production configuration file.
pub const PRODUCTION_ENVIRONMENT: &str = "production";

/// Environment name selecting the development configuration file.
pub const DEVELOPMENT_ENVIRONMENT: &str = "development";

/// Deepest import nesting followed before an import is ignored.
///
/// The root document is depth 0; an import found at depth 6 is still loaded,
/// anything below it is truncated.
pub const MAX_IMPORT_DEPTH: usize = 6;

/// Default GitHub REST API endpoint.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Response header carrying the remaining GitHub API quota.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Timeout applied to every outgoing HTTP request (10 seconds).
///
/// A hung content request would otherwise stall the whole resolution.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Retries attempted after a retryable content failure (5xx, timeout, transport).
pub const DEFAULT_MAX_RETRIES: usize = 2;

/// Starting delay for exponential backoff between retries (100ms).
pub const STARTING_BACKOFF_DELAY_MS: u64 = 100;

/// Growth factor between consecutive backoff delays (100ms, 200ms, 400ms, ...).
pub const BACKOFF_MULTIPLIER: u64 = 2;

/// Maximum backoff delay between retries (2 seconds).
pub const MAX_BACKOFF_DELAY_MS: u64 = 2_000;
