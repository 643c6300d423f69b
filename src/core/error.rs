//! Error handling for the plugin SDK
//!
//! This module provides the strongly-typed error enum used across the SDK and
//! the user-facing error context the `uos` binary prints. The error system
//! follows two rules:
//! 1. **Failures local to one source never escape a resolution.** Loaders,
//!    decoders and fetchers log and degrade to "nothing contributed"; only
//!    programming errors and manifest validation failures surface as
//!    [`SdkError`] values.
//! 2. **Errors shown to a human carry a suggestion.** [`user_friendly_error`]
//!    maps an [`anyhow::Error`] chain to an [`ErrorContext`].
//!
//! # Error Categories
//!
//! - **Identifiers**: [`SdkError::InvalidIdentifier`], [`SdkError::InvalidImport`]
//! - **Manifests**: [`SdkError::InvalidManifest`], [`SdkError::ManifestParseError`]
//! - **Configuration**: [`SdkError::ConfigurationInvalid`], [`SdkError::ConfigError`]
//! - **Transport**: [`SdkError::NetworkError`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use uos_plugin_sdk::core::{SdkError, user_friendly_error};
//!
//! let error = SdkError::InvalidIdentifier {
//!     value: "not a plugin".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for SDK operations.
#[derive(Error, Debug)]
pub enum SdkError {
    /// A plugin key does not follow `owner/repo[:workflowId][@ref]` and is not a URL.
    #[error("Invalid plugin identifier: {value}")]
    InvalidIdentifier {
        /// The rejected identifier string
        value: String,
    },

    /// An `imports` entry is not an `owner/repo` pair.
    #[error("Invalid import location: {value}")]
    InvalidImport {
        /// The rejected import string
        value: String,
    },

    /// A manifest document was fetched but does not satisfy the manifest schema.
    ///
    /// This is the one failure the manifest fetcher raises instead of turning
    /// it into "no manifest"; the plugin enricher catches it.
    #[error("Manifest for '{plugin}' is invalid: {}", errors.join("; "))]
    InvalidManifest {
        /// Identifier of the plugin whose manifest failed validation
        plugin: String,
        /// Individual validation failures
        errors: Vec<String>,
    },

    /// A manifest body is not valid JSON.
    #[error("Manifest for '{plugin}' could not be parsed: {reason}")]
    ManifestParseError {
        /// Identifier of the plugin
        plugin: String,
        /// Parser message
        reason: String,
    },

    /// A configuration document failed parsing or validation.
    ///
    /// Resolutions log and skip such documents; `uos resolve --repo-only`
    /// reports them with this error.
    #[error("Configuration for {location} is invalid: {}", errors.join("; "))]
    ConfigurationInvalid {
        /// `owner/repo` the document came from
        location: String,
        /// Validation and decode failures
        errors: Vec<String>,
    },

    /// A request to a remote endpoint failed.
    #[error("Network error: {operation}")]
    NetworkError {
        /// The network operation that failed
        operation: String,
        /// Reason for the failure
        reason: String,
    },

    /// The SDK's own settings are unusable.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Error wrapper that adds user-facing details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying SDK error
    pub error: SdkError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: SdkError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with an actionable suggestion.
///
/// Recognizes [`SdkError`] (also behind an `Arc`), [`std::io::Error`] and
/// [`toml::de::Error`]; anything else is wrapped as [`SdkError::Other`] with
/// the full cause chain as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(sdk_error) = error.downcast_ref::<SdkError>() {
        return create_error_context(sdk_error);
    }

    if let Some(sdk_error) = error.downcast_ref::<std::sync::Arc<SdkError>>() {
        return create_error_context(sdk_error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return ErrorContext::new(SdkError::Other {
            message: format!("IO error: {io_error}"),
        })
        .with_suggestion("Check that the file exists and is readable");
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(SdkError::ConfigError {
            message: toml_error.message().to_string(),
        })
        .with_suggestion("Fix the TOML syntax in your SDK config file")
        .with_details("The SDK reads ~/.ubiquity-os/config.toml unless --config is given");
    }

    let details = error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>().join("\n");
    let ctx = ErrorContext::new(SdkError::Other {
        message: error.to_string(),
    });
    if details.is_empty() { ctx } else { ctx.with_details(details) }
}

fn create_error_context(error: &SdkError) -> ErrorContext {
    match error {
        SdkError::InvalidIdentifier { value } => ErrorContext::new(SdkError::InvalidIdentifier {
            value: value.clone(),
        })
        .with_suggestion("Use 'owner/repo', 'owner/repo:workflow.yml@ref' or an https:// URL")
        .with_details("Plugin keys are matched against owner/repo[:workflowId][@ref]"),
        SdkError::InvalidImport { value } => ErrorContext::new(SdkError::InvalidImport {
            value: value.clone(),
        })
        .with_suggestion("Import entries must be plain 'owner/repo' pairs"),
        SdkError::InvalidManifest { plugin, errors } => {
            ErrorContext::new(SdkError::InvalidManifest {
                plugin: plugin.clone(),
                errors: errors.clone(),
            })
            .with_suggestion("Check that manifest.json has at least 'name' and 'short_name'")
        }
        SdkError::ConfigurationInvalid { location, errors } => {
            ErrorContext::new(SdkError::ConfigurationInvalid {
                location: location.clone(),
                errors: errors.clone(),
            })
            .with_suggestion("Fix the listed entries in the repository's .ubiquity-os config file")
            .with_details("Invalid documents are skipped when plugins resolve their configuration")
        }
        SdkError::NetworkError { operation, reason } => {
            ErrorContext::new(SdkError::NetworkError {
                operation: operation.clone(),
                reason: reason.clone(),
            })
            .with_details(reason.clone())
            .with_suggestion("Check your network connection and GITHUB_TOKEN")
        }
        other => ErrorContext::new(SdkError::Other {
            message: other.to_string(),
        }),
    }
}
