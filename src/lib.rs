//! UbiquityOS Plugin SDK
//!
//! Resolves which plugins a GitHub repository runs, and with which settings,
//! from `.ubiquity-os.config.yml` files, their imports and plugin manifests.
//!
//! # Architecture Overview
//!
//! A resolution for `owner/repo` reads two documents through a
//! [`source::ContentSource`]:
//!
//! - the organization document in `owner/.ubiquity-os`
//! - the repository document in `owner/repo`
//!
//! Each document may `import` other repositories' documents. Imports are
//! resolved recursively, deduplicated, cycle-safe and capped at a fixed
//! depth; the importing document always wins over what it imports. The
//! repository result is merged over the organization result, and every
//! plugin entry is then completed from its `manifest.json` (default
//! listeners and `skipBotEvents`).
//!
//! Failures of a single source (missing files, malformed YAML, schema
//! violations, unreachable manifests) are logged and skipped: a resolution
//! always produces a configuration.
//!
//! # Core Modules
//!
//! ## Resolution
//! - [`resolver`] - [`resolver::ConfigurationHandler`], the SDK entry point
//! - [`configuration`] - Document model, YAML parsing, validation, imports, merging
//! - [`manifest`] - Plugin manifests, fetched and cached per plugin
//! - [`identifier`] - Plugin keys and `owner/repo` locations
//!
//! ## Transport
//! - [`source`] - Content source abstraction and the GitHub REST implementation
//!
//! ## Supporting Modules
//! - [`config`] - SDK settings (~/.ubiquity-os/config.toml)
//! - [`constants`] - File paths, limits and timeouts
//! - [`core`] - Error types and user-facing error formatting
//! - [`cli`] - The `uos` configuration inspector
//! - [`utils`] - URL helpers
//!
//! # Configuration Format
//!
//! ```yaml
//! imports:
//!   - ubiquity-os/shared-config
//! plugins:
//!   ubiquity-os/command-start-stop@v1:
//!     with:
//!       reviewDelayTolerance: 1 Day
//!     runsOn: [issue_comment.created]
//!   https://text-conversation-rewards.ubiquity.workers.dev:
//!     skipBotEvents: false
//! ```
//!
//! The file is `.github/.ubiquity-os.config.yml` in production and
//! `.github/.ubiquity-os.config.dev.yml` in development; other environment
//! names select `.github/.ubiquity-os.config.<env>.yml` with a fall back to
//! the development file.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use uos_plugin_sdk::identifier::Location;
//! use uos_plugin_sdk::resolver::ConfigurationHandler;
//! use uos_plugin_sdk::source::GithubContentSource;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let source = GithubContentSource::new("https://api.github.com", None, std::time::Duration::from_secs(10), 2)?;
//! let handler = ConfigurationHandler::new(Arc::new(source), "production")?;
//!
//! let config = handler.get_configuration(Some(&Location::new("ubiquity", "work.ubq.fi"))).await;
//! println!("{} plugins enabled", config.plugins.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Resolved configuration of a repository
//! uos resolve ubiquity/work.ubq.fi
//!
//! # Development configuration, as YAML
//! uos resolve ubiquity/work.ubq.fi --environment development --format yaml
//!
//! # Settings a plugin receives
//! uos self-config ubiquity/work.ubq.fi --manifest ./manifest.json
//! ```

// Resolution
pub mod configuration;
pub mod identifier;
pub mod manifest;
pub mod resolver;

// Transport
pub mod source;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
