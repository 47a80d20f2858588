use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::tokens::TokenTable;
use super::ConfigError;

/// Key under which the configuration directory is exposed by [`ResolvedConfig::into_entries`].
pub const DIR_KEY: &str = "dir";

/// Key under which the environment name is exposed by [`ResolvedConfig::into_entries`].
pub const ENV_KEY: &str = "env";

/// The outcome of one configuration resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub(crate) dir: PathBuf,
    pub(crate) env: String,
    pub(crate) values: Map<String, Value>,
    pub(crate) raw: Map<String, Value>,
    pub(crate) tokens: TokenTable,
}

impl ResolvedConfig {
    /// Canonical configuration directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolved environment name.
    pub fn env(&self) -> &str {
        &self.env
    }

    /// Top-level values after token substitution.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Top-level values before token substitution, reserved keys removed.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// The token table used for substitution.
    pub fn tokens(&self) -> &TokenTable {
        &self.tokens
    }

    /// Deserializes the substituted values into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        serde_json::from_value(Value::Object(self.values.clone()))
            .map_err(ConfigError::DeserializeError)
    }

    /// All substituted values plus `dir` and `env`.
    ///
    /// A document key named `dir` or `env` takes precedence over the
    /// resolved value.
    pub fn into_entries(self) -> Map<String, Value> {
        let mut entries = Map::new();
        entries.insert(
            DIR_KEY.to_string(),
            Value::String(self.dir.to_string_lossy().into_owned()),
        );
        entries.insert(ENV_KEY.to_string(), Value::String(self.env));
        entries.extend(self.values);
        entries
    }
}
