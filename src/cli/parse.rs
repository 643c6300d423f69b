//! The `parse` command: show how a plugin key is interpreted.

use anyhow::Result;
use clap::Args;

use super::OutputFormat;
use crate::identifier::PluginIdentifier;

/// Parse a plugin identifier.
#[derive(Args, Debug)]
pub struct ParseCommand {
    /// `owner/repo[:workflowId][@ref]` or a plugin URL
    pub identifier: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

impl ParseCommand {
    /// Print the parsed identifier.
    ///
    /// # Errors
    ///
    /// Returns [`crate::core::SdkError::InvalidIdentifier`] for keys that are
    /// neither a repository plugin nor a URL.
    pub fn execute(self) -> Result<()> {
        println!("{}", self.render()?);
        Ok(())
    }

    fn render(&self) -> Result<String> {
        let plugin = PluginIdentifier::parse(self.identifier.trim())?;
        self.format.render(&plugin)
    }
}
