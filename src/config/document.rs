//! Parsed configuration documents and the recursive merge between them.

use std::path::Path;

use serde_json::{Map, Value};

use super::ConfigError;

/// Reserved key naming a parent document.
pub const EXTENDS_KEY: &str = "$extends";

/// Reserved key holding token parameters.
pub const PARAMS_KEY: &str = "$params";

/// One configuration document with its reserved keys split out.
///
/// `values` never contains `$extends` or `$params`; those live in the
/// tagged fields and are consumed by the loader and the resolver.
///
/// `params` keeps declaration order. A `null` parameter is recorded as
/// `None`: it shadows a parent's value but declares no token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    pub extends: Option<String>,
    pub params: Vec<(String, Option<String>)>,
    pub values: Map<String, Value>,
}

impl ConfigDocument {
    /// Builds a document from a parsed JSON value read from `path`.
    pub fn from_value(path: &Path, value: Value) -> Result<Self, ConfigError> {
        let Value::Object(object) = value else {
            return Err(ConfigError::NotAnObject(path.to_path_buf()));
        };

        let invalid = |key: &str, reason: String| ConfigError::InvalidDirective {
            path: path.to_path_buf(),
            key: key.to_string(),
            reason,
        };

        let mut extends = None;
        let mut params = Vec::new();
        let mut values = Map::new();

        for (key, value) in object {
            match key.as_str() {
                EXTENDS_KEY => {
                    extends = Some(extends_name(value).map_err(|r| invalid(EXTENDS_KEY, r))?);
                }
                PARAMS_KEY => {
                    params = param_block(value).map_err(|r| invalid(PARAMS_KEY, r))?;
                }
                _ => {
                    values.insert(key, value);
                }
            }
        }

        Ok(Self {
            extends,
            params,
            values,
        })
    }

    /// Parameters that declare a token, in declaration order.
    ///
    /// Token names are case-insensitive, so a later entry replaces any
    /// earlier one of the same name; a later `null` removes it.
    pub fn declared_params(&self) -> Vec<(&str, &str)> {
        let mut declared: Vec<(&str, &str)> = Vec::with_capacity(self.params.len());
        for (name, value) in &self.params {
            declared.retain(|(earlier, _)| !earlier.eq_ignore_ascii_case(name));
            if let Some(value) = value {
                declared.push((name.as_str(), value.as_str()));
            }
        }
        declared
    }

    /// Overlays this document on top of `parent`.
    ///
    /// Values and parameters from `self` win at every depth. The result
    /// carries no `$extends`, since the directive has been applied.
    pub fn merge_over(self, parent: ConfigDocument) -> ConfigDocument {
        let mut values = parent.values;
        deep_merge(&mut values, self.values);

        let mut params = parent.params;
        params.retain(|(name, _)| !self.params.iter().any(|(own, _)| own == name));
        params.extend(self.params);

        ConfigDocument {
            extends: None,
            params,
            values,
        }
    }
}

/// Merges `overlay` into `base`; nested objects merge recursively, anything else replaces.
pub fn deep_merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(base_map)), Value::Object(overlay_map)) => {
                deep_merge(base_map, overlay_map);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn extends_name(value: Value) -> Result<String, String> {
    match value {
        Value::String(name) if name.is_empty() => Err("must not be empty".into()),
        Value::String(name) => Ok(name),
        other => Err(format!("expected a string, found {}", kind(&other))),
    }
}

/// Stringifies a `$params` block. `null` entries are kept as `None`.
fn param_block(value: Value) -> Result<Vec<(String, Option<String>)>, String> {
    let Value::Object(block) = value else {
        return Err(format!("expected an object, found {}", kind(&value)));
    };

    block
        .into_iter()
        .map(|(name, value)| {
            let text = match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                other => {
                    return Err(format!(
                        "parameter '{name}' must be a scalar, found {}",
                        kind(&other)
                    ));
                }
            };
            Ok((name, text))
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
