//! Test fixtures for plugin manifests.

use serde_json::{Value, json};

use crate::manifest::Manifest;

/// Builder for `manifest.json` documents.
#[derive(Clone, Debug)]
pub struct ManifestFixture {
    value: Value,
}

impl ManifestFixture {
    /// Minimal valid manifest for `short_name`.
    #[must_use]
    pub fn new(short_name: &str) -> Self {
        Self {
            value: json!({
                "name": format!("Plugin {short_name}"),
                "short_name": short_name,
            }),
        }
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        if let Some(object) = self.value.as_object_mut() {
            object.insert(key.to_string(), value);
        }
        self
    }

    /// Set `ubiquity:listeners`.
    #[must_use]
    pub fn with_listeners(self, listeners: &[&str]) -> Self {
        self.set("ubiquity:listeners", json!(listeners))
    }

    /// Set `skipBotEvents`.
    #[must_use]
    pub fn with_skip_bot_events(self, skip: bool) -> Self {
        self.set("skipBotEvents", json!(skip))
    }

    /// Set `homepage_url`.
    #[must_use]
    pub fn with_homepage(self, url: &str) -> Self {
        self.set("homepage_url", json!(url))
    }

    /// Set `commands`.
    #[must_use]
    pub fn with_commands(self, commands: Value) -> Self {
        self.set("commands", commands)
    }

    /// The manifest as a JSON value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// The manifest as JSON text, as served by a repository or URL.
    #[must_use]
    pub fn to_json(&self) -> String {
        self.value.to_string()
    }

    /// The decoded manifest.
    ///
    /// # Panics
    ///
    /// Panics if the fixture was given values that do not decode.
    #[must_use]
    pub fn build(&self) -> Manifest {
        serde_json::from_value(self.value.clone())
            .unwrap_or_else(|e| panic!("manifest fixture does not decode: {e}"))
    }
}
