//! SDK settings.
//!
//! This is the configuration of the SDK itself (which GitHub endpoint, which
//! token, which environment), not the plugin configuration documents it
//! resolves; those live in [`crate::configuration`].
//!
//! - [`global`] - `~/.ubiquity-os/config.toml` with environment overrides

pub mod global;

pub use global::{GithubSettings, GlobalConfig, HttpSettings};
