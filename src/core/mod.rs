//! Core types for the plugin SDK
//!
//! Error handling lives here:
//! - [`SdkError`] - Enumerated failure modes of the SDK
//! - [`ErrorContext`] - User-facing wrapper with details and suggestions
//! - [`user_friendly_error`] - Convert any [`anyhow::Error`] for CLI display

pub mod error;

pub use error::{ErrorContext, SdkError, user_friendly_error};
