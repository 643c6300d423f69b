//! Plugin identifiers and repository locations.
//!
//! Plugin keys in a configuration document come in two shapes:
//!
//! - **GitHub plugins**: `owner/repo[:workflowId][@ref]`, e.g.
//!   `ubiquity-os/command-start-stop:compute.yml@v1.2.0`. The workflow defaults
//!   to [`DEFAULT_WORKFLOW_ID`]; the ref may contain `/` (`feature/branch`).
//! - **URL plugins**: a bare `http://` or `https://` base URL of a hosted plugin.
//!
//! Import entries and configuration lookups use a plain [`Location`]
//! (`owner/repo`), which is also the identity used for import caching and
//! cycle detection.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use crate::constants::DEFAULT_WORKFLOW_ID;
use crate::core::SdkError;

static PLUGIN_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9a-zA-Z_.-]+)/([0-9a-zA-Z_.-]+)(?::([0-9a-zA-Z_.-]+))?(?:@([0-9a-zA-Z_.-]+(?:/[0-9a-zA-Z_.-]+)*))?$",
    )
    .expect("plugin identifier pattern is valid")
});

static LOCATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-zA-Z_.-]+)/([0-9a-zA-Z_.-]+)$").expect("location pattern is valid")
});

/// A plugin hosted in a GitHub repository and run through a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GithubPlugin {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Workflow file dispatched for this plugin
    #[serde(rename = "workflowId")]
    pub workflow_id: String,
    /// Branch, tag or commit the plugin is pinned to
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl GithubPlugin {
    /// Key under which this plugin's manifest is cached.
    ///
    /// Owner and repository are lower-cased like [`Location::key`]; the ref
    /// is kept as written since branch and tag names are case-sensitive.
    #[must_use]
    pub fn manifest_key(&self) -> String {
        let owner = self.owner.to_lowercase();
        let repo = self.repo.to_lowercase();
        match &self.reference {
            Some(reference) => format!("{owner}:{repo}:{reference}"),
            None => format!("{owner}:{repo}"),
        }
    }

    /// The repository the plugin lives in.
    #[must_use]
    pub fn location(&self) -> Location {
        Location::new(&self.owner, &self.repo)
    }
}

impl fmt::Display for GithubPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.repo, self.workflow_id)?;
        if let Some(reference) = &self.reference {
            write!(f, "@{reference}")?;
        }
        Ok(())
    }
}

/// Parse a plugin identifier of the form `owner/repo[:workflowId][@ref]`.
///
/// # Examples
///
/// ```rust
/// use uos_plugin_sdk::identifier::parse_plugin_identifier;
///
/// let plugin = parse_plugin_identifier("ubiquity-os/plugin-name:custom.yml@v1.0.0").unwrap();
/// assert_eq!(plugin.owner, "ubiquity-os");
/// assert_eq!(plugin.workflow_id, "custom.yml");
/// assert_eq!(plugin.reference.as_deref(), Some("v1.0.0"));
/// ```
///
/// # Errors
///
/// Returns [`SdkError::InvalidIdentifier`] when the string does not match.
pub fn parse_plugin_identifier(value: &str) -> Result<GithubPlugin, SdkError> {
    let captures = PLUGIN_NAME_REGEX.captures(value).ok_or_else(|| SdkError::InvalidIdentifier {
        value: value.to_string(),
    })?;

    Ok(GithubPlugin {
        owner: captures[1].to_string(),
        repo: captures[2].to_string(),
        workflow_id: captures
            .get(3)
            .map_or_else(|| DEFAULT_WORKFLOW_ID.to_string(), |m| m.as_str().to_string()),
        reference: captures.get(4).map(|m| m.as_str().to_string()),
    })
}

/// Returns `true` when a plugin key names a hosted plugin by URL.
#[must_use]
pub fn is_url_plugin(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

/// Either kind of plugin a configuration key can refer to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PluginIdentifier {
    /// `owner/repo[:workflowId][@ref]`
    Github(GithubPlugin),
    /// Base URL of a hosted plugin
    Url {
        /// The URL exactly as written in the configuration
        url: String,
    },
}

impl PluginIdentifier {
    /// Classify and parse a plugin key.
    ///
    /// URL keys never go through the `owner/repo` grammar, but they must
    /// still be well-formed URLs.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::InvalidIdentifier`] for keys that are neither.
    pub fn parse(value: &str) -> Result<Self, SdkError> {
        if is_url_plugin(value) {
            reqwest::Url::parse(value).map_err(|_| SdkError::InvalidIdentifier {
                value: value.to_string(),
            })?;
            return Ok(Self::Url {
                url: value.to_string(),
            });
        }
        parse_plugin_identifier(value).map(Self::Github)
    }
}

impl fmt::Display for PluginIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Github(plugin) => plugin.fmt(f),
            Self::Url { url } => f.write_str(url),
        }
    }
}

/// A repository, the unit of identity for configuration lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl Location {
    /// Create a location from its parts.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse an `owner/repo` string, surrounding whitespace ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::InvalidImport`] for anything else.
    pub fn parse(value: &str) -> Result<Self, SdkError> {
        let trimmed = value.trim();
        let captures = LOCATION_REGEX.captures(trimmed).ok_or_else(|| SdkError::InvalidImport {
            value: value.to_string(),
        })?;
        Ok(Self::new(&captures[1], &captures[2]))
    }

    /// Case-insensitive identity key (`owner/repo`, lower-cased).
    ///
    /// GitHub treats owner and repository names case-insensitively, so two
    /// imports differing only in case are the same location.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.owner, self.repo).to_lowercase()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
