//! `uos` CLI entry point
//!
//! Inspects UbiquityOS plugin configuration from the command line:
//! - `resolve` - Resolve a repository's configuration
//! - `self-config` - Find the settings a plugin was enabled with
//! - `parse` - Parse a plugin identifier

use anyhow::Result;
use clap::Parser;
use uos_plugin_sdk::cli;
use uos_plugin_sdk::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
