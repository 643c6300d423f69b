//! The `resolve` command: print the configuration a repository resolves to.
//!
//! By default the full pipeline runs (organization and repository documents,
//! imports, manifest enrichment). With `--repo-only` only the repository's
//! own document and its imports are read; validation issues are printed
//! alongside the result and make the command fail.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::{CliConfig, OutputFormat};
use crate::core::SdkError;
use crate::identifier::Location;
use crate::resolver::ConfigurationHandler;

/// Resolve the configuration of a repository.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Repository as `owner/repo`
    pub repository: String,

    /// Environment whose configuration file is read (overrides the SDK config)
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Skip the organization document and manifests; report validation issues
    #[arg(long)]
    pub repo_only: bool,
}

impl ResolveCommand {
    /// Run against the GitHub API as configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository is not `owner/repo`, the SDK
    /// config cannot be loaded or the HTTP client cannot be built. With
    /// `--repo-only`, an invalid repository document is reported as
    /// [`SdkError::ConfigurationInvalid`] after the result is printed.
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let location = Location::parse(&self.repository)?;
        let mut global = config.load_global_config().await?;
        if let Some(environment) = &self.environment {
            global.environment.clone_from(environment);
        }

        info!(repo = %location, environment = %global.environment, "Resolving configuration");
        let handler = ConfigurationHandler::from_config(&global)?;
        let (output, invalid) = self.render_with(&handler, &location).await?;
        println!("{output}");
        invalid.map_or(Ok(()), |error| Err(error.into()))
    }

    /// Resolve `location` with `handler` and encode the result.
    ///
    /// With `--repo-only` the issues of the repository document, if any, are
    /// returned next to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if the result cannot be serialized.
    pub async fn render_with(
        &self,
        handler: &ConfigurationHandler,
        location: &Location,
    ) -> Result<(String, Option<SdkError>)> {
        if self.repo_only {
            let result =
                handler.get_configuration_from_repo(&location.owner, &location.repo).await;
            return Ok((self.format.render(&result)?, result.validation_error(location)));
        }

        let resolved = handler.get_configuration(Some(location)).await;
        Ok((self.format.render(&resolved)?, None))
    }
}
