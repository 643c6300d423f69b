//! Integration test suite for the plugin SDK
//!
//! End-to-end tests of configuration resolution through the public API, the
//! GitHub content source (against a local mock server) and the `uos` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: The `uos` binary
//! - **configuration_handler**: Organization/repository merging and enrichment
//! - **github_source**: Resolution over the GitHub REST contents API
//! - **imports**: Import chains, cycles, sharing and precedence
//! - **manifest_fetch**: Hosted plugin manifests and caching

mod cli;
mod configuration_handler;
mod github_source;
mod imports;
mod manifest_fetch;
