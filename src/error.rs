use crate::config::ConfigError;
use thiserror::Error;

/// Top-level error type for the envfig library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("application context requires a configuration")]
    MissingConfig,

    #[error("no value registered under '{0}'")]
    MissingKey(String),

    #[error("value registered under '{key}' has an unexpected shape: {source}")]
    Deserialize {
        key: String,
        source: serde_json::Error,
    },
}
