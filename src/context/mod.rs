//! Application registry populated from a resolved configuration.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::ResolvedConfig;
use crate::Error;

/// Key holding the configuration before token substitution.
pub const CONFIG_KEY: &str = "config";

/// Key holding the token table used for substitution.
pub const PARAMS_KEY: &str = "config.params";

/// Shared application registry.
///
/// Holds string-keyed values: whatever the host registered up front, then
/// the configuration. Configuration keys overwrite earlier registrations;
/// anything the configuration does not name is kept as-is.
///
/// ## Example
///
/// ```no_run
/// use envfig::{AppContext, Config};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Database {
///     url: String,
/// }
///
/// let ctx = AppContext::builder()
///     .with_value("app.name", "billing")
///     .with_config(Config::builder().with_dir("config").build()?)
///     .build()?;
///
/// let db: Database = ctx.get_as("database")?;
/// println!("{} running in {} from {}", db.url, ctx.env(), ctx.dir().display());
/// # Ok::<(), envfig::Error>(())
/// ```
#[derive(Debug)]
pub struct AppContext {
    config: ResolvedConfig,
    registry: Map<String, Value>,
}

impl AppContext {
    /// Creates a new builder for constructing an `AppContext`.
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::default()
    }

    /// The configuration this context was built from.
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn env(&self) -> &str {
        self.config.env()
    }

    pub fn dir(&self) -> &Path {
        self.config.dir()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.registry.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.registry.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    /// Deserializes the value registered under `key`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, Error> {
        let value = self
            .registry
            .get(key)
            .ok_or_else(|| Error::MissingKey(key.to_string()))?;
        serde_json::from_value(value.clone()).map_err(|source| Error::Deserialize {
            key: key.to_string(),
            source,
        })
    }
}

/// Builder for constructing an [`AppContext`].
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct AppContextBuilder {
    values: Map<String, Value>,
    config: Option<ResolvedConfig>,
}

impl AppContextBuilder {
    /// Registers a value ahead of the configuration.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Attaches the resolved configuration.
    pub fn with_config(mut self, config: ResolvedConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the `AppContext`.
    ///
    /// Returns an error if no configuration was provided.
    pub fn build(self) -> Result<AppContext, Error> {
        let config = self.config.ok_or(Error::MissingConfig)?;

        let mut registry = self.values;
        registry.insert(CONFIG_KEY.to_string(), Value::Object(config.raw().clone()));
        registry.insert(PARAMS_KEY.to_string(), config.tokens().to_value());
        registry.extend(config.clone().into_entries());

        Ok(AppContext { config, registry })
    }
}
