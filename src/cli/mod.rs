//! Command-line interface of the `uos` configuration inspector.
//!
//! The binary exposes the SDK's resolution engine for debugging repository
//! configuration without deploying a plugin:
//!
//! - `resolve` - Print the resolved configuration of a repository
//! - `self-config` - Print the settings a plugin was enabled with
//! - `parse` - Show how a plugin key is interpreted
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - Debug logging on stderr
//! - `--quiet` / `-q` - No logging unless `RUST_LOG` is set
//! - `--config` / `-c` - SDK config file instead of `~/.ubiquity-os/config.toml`
//!
//! `RUST_LOG` always takes precedence over `--verbose`.
//!
//! # Examples
//!
//! ```bash
//! uos resolve ubiquity/work.ubq.fi
//! uos resolve ubiquity/work.ubq.fi --environment development --format yaml
//! uos self-config ubiquity/work.ubq.fi --manifest ./manifest.json
//! uos parse ubiquity-os/command-start-stop:compute.yml@v1
//! ```
//!
//! Output goes to stdout, logs to stderr, so results can be piped into `jq`.

mod parse;
mod resolve;
mod self_config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::GlobalConfig;

pub use parse::ParseCommand;
pub use resolve::ResolveCommand;
pub use self_config::SelfConfigCommand;

/// Runtime settings derived from the global options.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter to install; `None` disables logging unless `RUST_LOG` is set
    pub log_level: Option<String>,
    /// SDK config file given with `--config`
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the stderr tracing subscriber.
    ///
    /// Does nothing when a subscriber is already installed.
    pub fn init_logging(&self) {
        let filter = if std::env::var_os("RUST_LOG").is_some() {
            EnvFilter::from_default_env()
        } else if let Some(level) = &self.log_level {
            EnvFilter::new(format!("uos_plugin_sdk={level}"))
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Load the SDK settings, environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub async fn load_global_config(&self) -> Result<GlobalConfig> {
        let config = match &self.config_path {
            Some(path) => GlobalConfig::load_with_optional(Some(path.clone())).await?,
            None => GlobalConfig::load().await?,
        };
        Ok(config.apply_env_overrides())
    }
}

/// Output encodings for command results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML, as it would be written in a configuration file
    Yaml,
}

impl OutputFormat {
    /// Encode `value` in this format.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        Ok(match self {
            Self::Json => serde_json::to_string_pretty(value)?,
            Self::Yaml => serde_yaml::to_string(value)?.trim_end().to_string(),
        })
    }
}

/// Inspect UbiquityOS plugin configuration.
#[derive(Parser)]
#[command(
    name = "uos",
    about = "UbiquityOS plugin SDK - inspect plugin configuration",
    version,
    long_about = "Resolves .ubiquity-os.config.yml files the way the kernel and plugins do: \
                  organization and repository documents, their imports and plugin manifests."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable logging
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the SDK config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the configuration of a repository
    Resolve(ResolveCommand),

    /// Find the settings a plugin was enabled with
    SelfConfig(SelfConfigCommand),

    /// Parse a plugin identifier
    Parse(ParseCommand),
}

impl Cli {
    /// Execute the selected command.
    ///
    /// # Errors
    ///
    /// Returns the command's error; `main` prints it with suggestions.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Derive runtime settings from the global options.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute the selected command with explicit runtime settings.
    ///
    /// # Errors
    ///
    /// Returns the command's error.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Resolve(cmd) => cmd.execute(&config).await,
            Commands::SelfConfig(cmd) => cmd.execute(&config).await,
            Commands::Parse(cmd) => cmd.execute(),
        }
    }
}
