//! Configuration loading and management.

mod builder;
mod document;
mod env;
mod error;
mod file;
mod resolved;
mod tokens;

pub use builder::Config;
pub use document::{deep_merge, ConfigDocument, EXTENDS_KEY, PARAMS_KEY};
pub use env::{resolve_environment, EnvLookup, ProcessEnv, DEFAULT_ENV, DEFAULT_ENV_VAR};
pub use error::ConfigError;
pub use file::{document_path, load_document, EXTENSION};
pub use resolved::{ResolvedConfig, DIR_KEY, ENV_KEY};
pub use tokens::{substitute, TokenTable, TokenTableBuilder, DIR_TOKEN, ENV_TOKEN};
