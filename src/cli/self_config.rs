//! The `self-config` command: the settings a plugin receives at a repository.
//!
//! Reads a local `manifest.json`, resolves the repository's configuration and
//! prints the `with` settings of the matching entry, or `null` when the
//! plugin is not enabled there.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::{CliConfig, OutputFormat};
use crate::identifier::Location;
use crate::manifest::{Manifest, decode_manifest};
use crate::resolver::ConfigurationHandler;

/// Find the settings a plugin was enabled with.
#[derive(Args, Debug)]
pub struct SelfConfigCommand {
    /// Repository as `owner/repo`
    pub repository: String,

    /// The plugin's manifest.json
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Environment whose configuration file is read (overrides the SDK config)
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

impl SelfConfigCommand {
    /// Run against the GitHub API as configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository is not `owner/repo`, the manifest
    /// cannot be read or is invalid, or the SDK config cannot be loaded.
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let location = Location::parse(&self.repository)?;
        let manifest = self.load_manifest().await?;

        let mut global = config.load_global_config().await?;
        if let Some(environment) = &self.environment {
            global.environment.clone_from(environment);
        }

        let handler = ConfigurationHandler::from_config(&global)?;
        println!("{}", self.render_with(&handler, &manifest, &location).await?);
        Ok(())
    }

    async fn load_manifest(&self) -> Result<Manifest> {
        let body = tokio::fs::read_to_string(&self.manifest)
            .await
            .with_context(|| format!("Failed to read manifest from {}", self.manifest.display()))?;
        Ok(decode_manifest(&self.manifest.display().to_string(), &body)?)
    }

    /// Look up `manifest`'s settings at `location` and encode them.
    ///
    /// # Errors
    ///
    /// Returns an error if the result cannot be serialized.
    pub async fn render_with(
        &self,
        handler: &ConfigurationHandler,
        manifest: &Manifest,
        location: &Location,
    ) -> Result<String> {
        let settings = handler.get_self_configuration(manifest, Some(location)).await;
        self.format.render(&settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CONFIG_PROD_FULL_PATH;
    use crate::test_utils::{ManifestFixture, MockContentSource};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn command(manifest: PathBuf) -> SelfConfigCommand {
        SelfConfigCommand {
            repository: "acme/demo".to_string(),
            manifest,
            environment: None,
            format: OutputFormat::Json,
        }
    }

    #[tokio::test]
    async fn test_load_manifest_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("manifest.json");
        tokio::fs::write(&path, ManifestFixture::new("acme/plugin@v1").to_json()).await.unwrap();

        let manifest = command(path).load_manifest().await.unwrap();
        assert_eq!(manifest.short_name, "acme/plugin@v1");
    }

    #[tokio::test]
    async fn test_missing_manifest_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = command(temp.path().join("absent.json")).load_manifest().await.unwrap_err();
        assert!(err.to_string().contains("Failed to read manifest"));
    }

    #[tokio::test]
    async fn test_render_settings_or_null() {
        let source = MockContentSource::new().with_file(
            "acme",
            "demo",
            CONFIG_PROD_FULL_PATH,
            "plugins:\n  acme/plugin@v1:\n    with:\n      label: x\n",
        );
        let handler = ConfigurationHandler::new(Arc::new(source), "production").unwrap();
        let cmd = command(PathBuf::from("manifest.json"));
        let location = Location::new("acme", "demo");

        let enabled = ManifestFixture::new("acme/plugin@v2").build();
        let output = cmd.render_with(&handler, &enabled, &location).await.unwrap();
        assert_eq!(output, "{\n  \"label\": \"x\"\n}");

        let other = ManifestFixture::new("acme/other").build();
        assert_eq!(cmd.render_with(&handler, &other, &location).await.unwrap(), "null");
    }
}
