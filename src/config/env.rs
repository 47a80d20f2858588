//! Environment detection and process environment access.

use std::collections::HashMap;

use tracing::debug;

/// Variable consulted when no explicit environment name is given.
pub const DEFAULT_ENV_VAR: &str = "SILEX_ENV";

/// Environment used when neither an explicit name nor the variable is set.
pub const DEFAULT_ENV: &str = "local";

/// Read-only lookup of environment variables.
///
/// Implementations report empty values as unset, so `FOO=` behaves the same
/// as `FOO` being absent.
pub trait EnvLookup: Send + Sync + std::fmt::Debug {
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|value| !value.is_empty())
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).filter(|value| !value.is_empty()).cloned()
    }
}

/// Picks the active environment name.
///
/// Precedence is `explicit`, then the variable named `var_name`, then `default`.
/// Empty strings count as unset at every level but the last.
pub fn resolve_environment<L>(
    explicit: Option<&str>,
    var_name: &str,
    default: &str,
    lookup: &L,
) -> String
where
    L: EnvLookup + ?Sized,
{
    if let Some(env) = explicit.filter(|env| !env.is_empty()) {
        debug!(env, "using explicit environment");
        return env.to_string();
    }

    if let Some(env) = lookup.var(var_name) {
        debug!(env = %env, var = var_name, "using environment from variable");
        return env;
    }

    debug!(env = default, "using default environment");
    default.to_string()
}
