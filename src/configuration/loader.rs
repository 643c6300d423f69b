//! Configuration file download.
//!
//! The environment name picks the candidate files:
//!
//! | Environment                | Candidates                                                |
//! |----------------------------|-----------------------------------------------------------|
//! | `production`, `prod`       | `.github/.ubiquity-os.config.yml`                         |
//! | `development`, `dev`       | `.github/.ubiquity-os.config.dev.yml`                     |
//! | anything else, e.g. `beta` | `.github/.ubiquity-os.config.beta.yml`, then the dev file |
//!
//! Other names are reduced to `[A-Za-z0-9_-]` before use; a name with nothing
//! left falls back to the dev file. Only production reads the production file.

use tracing::{debug, error, info, warn};

use crate::constants::{
    CONFIG_DEV_FULL_PATH, CONFIG_DIR, CONFIG_FILE_STEM, CONFIG_PROD_FULL_PATH,
    DEVELOPMENT_ENVIRONMENT, PRODUCTION_ENVIRONMENT,
};
use crate::source::{ContentError, ContentSource};

/// Configuration file paths to try for `environment`, in order.
///
/// ```rust
/// use uos_plugin_sdk::configuration::candidate_paths;
///
/// assert_eq!(candidate_paths("production"), vec![".github/.ubiquity-os.config.yml"]);
/// assert_eq!(
///     candidate_paths("staging"),
///     vec![".github/.ubiquity-os.config.staging.yml", ".github/.ubiquity-os.config.dev.yml"]
/// );
/// ```
#[must_use]
pub fn candidate_paths(environment: &str) -> Vec<String> {
    match environment.trim().to_ascii_lowercase().as_str() {
        PRODUCTION_ENVIRONMENT | "prod" => vec![CONFIG_PROD_FULL_PATH.to_string()],
        DEVELOPMENT_ENVIRONMENT | "dev" => vec![CONFIG_DEV_FULL_PATH.to_string()],
        _ => {
            let suffix: String = environment
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect();
            if suffix.is_empty() {
                vec![CONFIG_DEV_FULL_PATH.to_string()]
            } else {
                vec![
                    format!("{CONFIG_DIR}/{CONFIG_FILE_STEM}.{suffix}.yml"),
                    CONFIG_DEV_FULL_PATH.to_string(),
                ]
            }
        }
    }
}

/// Downloads the configuration document of a repository.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    environment: String,
    candidates: Vec<String>,
}

impl DocumentLoader {
    /// A loader reading the files of `environment`.
    pub fn new(environment: impl Into<String>) -> Self {
        let environment = environment.into();
        let candidates = candidate_paths(&environment);
        Self {
            environment,
            candidates,
        }
    }

    /// The environment this loader reads for.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Paths tried by [`DocumentLoader::download`], in order.
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Raw text of the first candidate file that exists in `owner/repo`.
    ///
    /// Returns `None` when every candidate is missing or failed, and without
    /// any request when `owner` or `repo` is empty. A failure on one candidate
    /// never stops the next one from being tried.
    pub async fn download(
        &self,
        source: &dyn ContentSource,
        owner: &str,
        repo: &str,
    ) -> Option<String> {
        if owner.is_empty() || repo.is_empty() {
            error!(owner, repo, "Repo or owner is not defined, cannot download the configuration");
            return None;
        }

        for path in &self.candidates {
            debug!(owner, repo, path = %path, "Attempting to fetch configuration");
            match source.get_content(owner, repo, path, None).await {
                Ok(content) => {
                    info!(
                        owner,
                        repo,
                        path = %path,
                        rate_limit_remaining = content.rate_limit_remaining(),
                        "Configuration file found"
                    );
                    return Some(content.data);
                }
                Err(ContentError::NotFound { .. }) => {
                    debug!(owner, repo, path = %path, "No configuration file found");
                }
                Err(err @ (ContentError::Timeout { .. } | ContentError::Transport { .. })) => {
                    warn!(owner, repo, path = %path, error = %err, "Failed to download configuration file");
                }
                Err(err) => {
                    error!(owner, repo, path = %path, error = %err, "Failed to download configuration file");
                }
            }
        }

        debug!(owner, repo, environment = %self.environment, "No configuration file in any candidate path");
        None
    }
}
