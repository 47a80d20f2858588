use std::path::{Path, PathBuf};

use serde_json::Map;
use tracing::info;

use super::env::{resolve_environment, EnvLookup, ProcessEnv, DEFAULT_ENV, DEFAULT_ENV_VAR};
use super::file::load_document;
use super::resolved::ResolvedConfig;
use super::tokens::{substitute, TokenTable};
use super::ConfigError;

/// Builder that resolves the configuration for one environment.
///
/// The environment name selects `<dir>/<env>.json`. That document may pull
/// in a parent with `$extends` and declare tokens with `$params`; every
/// string value is then run through `%TOKEN%` substitution.
///
/// ## Token precedence
///
/// Highest first:
///
/// 1. parameters passed with [`with_param`](Self::with_param)
/// 2. `__DIR__` and `__ENV__`
/// 3. the document's `$params`
/// 4. environment variables, consulted only for names none of the above define
///
/// ## Example
///
/// ```no_run
/// use envfig::Config;
///
/// // config/prod.json: {"$extends": "base", "db": {"url": "pg://%DB_HOST%/app"}}
/// let config = Config::builder()
///     .with_dir("config")
///     .with_env("prod")
///     .with_param("db_host", "db.internal")
///     .build()?;
///
/// assert_eq!(config.env(), "prod");
/// assert_eq!(config.values()["db"]["url"], "pg://db.internal/app");
/// # Ok::<(), envfig::ConfigError>(())
/// ```
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Config {
    dir: Option<PathBuf>,
    env: Option<String>,
    env_var: Option<String>,
    default_env: Option<String>,
    params: Vec<(String, String)>,
    env_lookup: Box<dyn EnvLookup>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dir: None,
            env: None,
            env_var: None,
            default_env: None,
            params: Vec::new(),
            env_lookup: Box::new(ProcessEnv),
        }
    }
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Sets the directory holding the environment documents. Required.
    pub fn with_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Forces the environment name, skipping detection.
    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    /// Names the variable read when no environment is forced. Defaults to `SILEX_ENV`.
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = Some(name.into());
        self
    }

    /// Environment used when nothing else selects one. Defaults to `local`.
    pub fn with_default_env(mut self, env: impl Into<String>) -> Self {
        self.default_env = Some(env.into());
        self
    }

    /// Adds a token override. Names are case-insensitive.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Adds several token overrides.
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Replaces the process environment as the source of variables.
    pub fn with_env_lookup(mut self, lookup: impl EnvLookup + 'static) -> Self {
        self.env_lookup = Box::new(lookup);
        self
    }

    /// Runs the resolution pipeline.
    pub fn build(self) -> Result<ResolvedConfig, ConfigError> {
        let dir = canonical_dir(self.dir.as_deref())?;
        let lookup = &*self.env_lookup;

        let env = resolve_environment(
            self.env.as_deref(),
            self.env_var.as_deref().unwrap_or(DEFAULT_ENV_VAR),
            self.default_env.as_deref().unwrap_or(DEFAULT_ENV),
            lookup,
        );

        let document = load_document(&dir, &env)?;

        let tokens = TokenTable::builder()
            .with_params(document.declared_params())
            .with_builtins(&dir, &env)
            .with_overrides(self.params)
            .build();

        let values: Map<_, _> = document
            .values
            .iter()
            .map(|(key, value)| (key.clone(), substitute(value.clone(), &tokens, lookup)))
            .collect();

        info!(env = %env, dir = %dir.display(), keys = values.len(), "configuration resolved");

        Ok(ResolvedConfig {
            dir,
            env,
            values,
            raw: document.values,
            tokens,
        })
    }
}

fn canonical_dir(dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let dir = dir.ok_or(ConfigError::MissingDirectory)?;
    let canonical = dir
        .canonicalize()
        .map_err(|source| ConfigError::InvalidDirectory {
            path: dir.to_path_buf(),
            source,
        })?;

    if !canonical.is_dir() {
        return Err(ConfigError::NotADirectory(canonical));
    }
    Ok(canonical)
}
