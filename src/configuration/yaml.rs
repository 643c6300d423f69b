//! YAML decoding into a JSON tree.
//!
//! Configuration documents are YAML, but validation and decoding work on
//! `serde_json::Value` so that passthrough keys survive unchanged. Scalar
//! mapping keys (numbers, booleans) become strings; any other key kind is a
//! parse error. Anchors and `<<` merge keys are expanded.

use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;
use tracing::{debug, error};

use super::ConfigurationIssue;

/// Result of [`parse_yaml`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedYaml {
    /// The document, `None` for empty input, a `null` document or a parse error
    pub document: Option<Value>,
    /// Parse errors, `None` when parsing succeeded
    pub errors: Option<Vec<ConfigurationIssue>>,
}

/// Parse raw configuration text.
///
/// Never fails: syntax errors are logged and returned in
/// [`ParsedYaml::errors`].
#[must_use]
pub fn parse_yaml(raw: Option<&str>) -> ParsedYaml {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return ParsedYaml::default();
    };

    debug!(bytes = raw.len(), "Parsing configuration YAML");

    let parsed = serde_yaml::from_str::<YamlValue>(raw)
        .map_err(|e| yaml_issue(&e))
        .and_then(|mut value| value.apply_merge().map(|()| value).map_err(|e| yaml_issue(&e)))
        .and_then(|value| yaml_to_json(value).map_err(|message| ConfigurationIssue::Yaml {
            message,
            line: None,
            column: None,
        }));

    match parsed {
        Ok(Value::Null) => ParsedYaml::default(),
        Ok(document) => ParsedYaml {
            document: Some(document),
            errors: None,
        },
        Err(issue) => {
            error!(%issue, "Configuration YAML could not be parsed");
            ParsedYaml {
                document: None,
                errors: Some(vec![issue]),
            }
        }
    }
}

fn yaml_issue(err: &serde_yaml::Error) -> ConfigurationIssue {
    let location = err.location();
    ConfigurationIssue::Yaml {
        message: err.to_string(),
        line: location.as_ref().map(serde_yaml::Location::line),
        column: location.as_ref().map(serde_yaml::Location::column),
    }
}

fn yaml_to_json(value: YamlValue) -> Result<Value, String> {
    Ok(match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => yaml_number(&n)?,
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect::<Result<_, _>>()?)
        }
        YamlValue::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                object.insert(mapping_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

/// JSON has no infinity or NaN, so `.inf` and `.nan` are rejected.
fn yaml_number(n: &serde_yaml::Number) -> Result<Value, String> {
    if let Some(i) = n.as_i64() {
        Ok(Value::Number(i.into()))
    } else if let Some(u) = n.as_u64() {
        Ok(Value::Number(u.into()))
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("{n} is not a finite number"))
    }
}

fn mapping_key(key: YamlValue) -> Result<String, String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Tagged(tagged) => mapping_key(tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => {
            Err("mapping keys must be scalars".to_string())
        }
    }
}
