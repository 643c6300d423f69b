//! Global SDK configuration.
//!
//! Settings for the concrete GitHub content source and the `uos` binary live
//! in a TOML file:
//!
//! - **Unix/macOS**: `~/.ubiquity-os/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\ubiquity-os\config.toml`
//! - **Override**: set `UOS_CONFIG_PATH`, or pass `--config` to the binary
//!
//! A missing file is not an error: every field has a default.
//!
//! ```toml
//! environment = "development"
//!
//! [github]
//! api_url = "https://api.github.com"
//! token = "ghp_xxxxxxxxxxxx"
//!
//! [http]
//! timeout_secs = 10
//! max_retries = 2
//! ```
//!
//! `GITHUB_TOKEN` and `UOS_ENVIRONMENT` override the file values, see
//! [`GlobalConfig::apply_env_overrides`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants::{
    DEFAULT_GITHUB_API_URL, DEFAULT_HTTP_TIMEOUT, DEFAULT_MAX_RETRIES, PRODUCTION_ENVIRONMENT,
};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "UOS_CONFIG_PATH";
/// Environment variable overriding `github.token`.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
/// Environment variable overriding `environment`.
pub const ENVIRONMENT_ENV: &str = "UOS_ENVIRONMENT";

fn default_environment() -> String {
    PRODUCTION_ENVIRONMENT.to_string()
}

fn default_api_url() -> String {
    DEFAULT_GITHUB_API_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT.as_secs()
}

const fn default_max_retries() -> usize {
    DEFAULT_MAX_RETRIES
}

/// Global configuration structure for the SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Deployment environment, selects which configuration file is read.
    ///
    /// `production` (default) reads `.github/.ubiquity-os.config.yml`,
    /// `development` reads the `.dev.yml` variant, any other name its own
    /// suffixed file with the development file as fallback.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// GitHub API access.
    #[serde(default)]
    pub github: GithubSettings,

    /// Outgoing HTTP behavior.
    #[serde(default)]
    pub http: HttpSettings,
}

/// `[github]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubSettings {
    /// REST API endpoint (GitHub Enterprise installs use their own)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Token sent as a bearer credential. Never serialized back out.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

/// `[http]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after a retryable content failure
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            github: GithubSettings::default(),
            http: HttpSettings::default(),
        }
    }
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl HttpSettings {
    /// The request timeout. Zero is treated as the default.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            DEFAULT_HTTP_TIMEOUT
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }
}

impl GlobalConfig {
    /// Load the global configuration from the default location.
    ///
    /// Honors `UOS_CONFIG_PATH`. Returns defaults when the file does not exist.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use uos_plugin_sdk::config::GlobalConfig;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let config = GlobalConfig::load().await?;
    /// println!("Reading configuration for {}", config.environment);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The default path cannot be determined
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML syntax
    pub async fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => PathBuf::from(path),
            None => Self::default_path()?,
        };
        Self::load_with_optional(Some(path)).await
    }

    /// Load the global configuration from `path`, or the default location.
    ///
    /// Missing files yield defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML syntax
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!(path = %path.display(), "No global config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load the global configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (permissions, not found, etc.)
    /// - The file contains invalid TOML syntax
    /// - The TOML structure doesn't match the expected schema
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// Platform-specific default path of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The home directory cannot be determined
    /// - The local data directory cannot be determined (Windows)
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("ubiquity-os")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".ubiquity-os")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Apply `GITHUB_TOKEN` and `UOS_ENVIRONMENT` on top of the file values.
    ///
    /// Empty variables are ignored.
    #[must_use]
    pub fn apply_env_overrides(mut self) -> Self {
        if let Some(token) = non_empty_env(GITHUB_TOKEN_ENV) {
            self.github.token = Some(token);
        }
        if let Some(environment) = non_empty_env(ENVIRONMENT_ENV) {
            self.environment = environment;
        }
        self
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
