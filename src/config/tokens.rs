//! `%TOKEN%` placeholder substitution.
//!
//! Placeholders are `%name%` where `name` is made of ASCII letters, digits and
//! underscores. Names are upper-cased before lookup. A placeholder resolves
//! from the [`TokenTable`] first, then from the environment; when neither
//! knows the name, the placeholder text is left in place.
//!
//! There is no escape syntax: any `%word%` is looked up.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use tracing::trace;

use super::env::EnvLookup;

/// Built-in token holding the canonical configuration directory.
pub const DIR_TOKEN: &str = "__DIR__";

/// Built-in token holding the resolved environment name.
pub const ENV_TOKEN: &str = "__ENV__";

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"%([A-Za-z0-9_]+)%").expect("placeholder pattern is valid")
    })
}

/// Upper-cased token names mapped to their replacement text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenTable {
    tokens: BTreeMap<String, String>,
}

impl TokenTable {
    pub fn builder() -> TokenTableBuilder {
        TokenTableBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tokens.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The table as a JSON object of strings.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.tokens
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

/// Assembles a [`TokenTable`] from its three layers.
///
/// Precedence, highest first: overrides, built-ins, document params.
/// Layers may be added in any order.
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct TokenTableBuilder {
    params: Vec<(String, String)>,
    builtins: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl TokenTableBuilder {
    /// Adds parameters declared by a document's `$params` block.
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

    /// Adds the `__DIR__` and `__ENV__` tokens.
    pub fn with_builtins(mut self, dir: &Path, env: &str) -> Self {
        self.builtins = vec![
            (DIR_TOKEN.to_string(), dir.to_string_lossy().into_owned()),
            (ENV_TOKEN.to_string(), env.to_string()),
        ];
        self
    }

    /// Adds caller-supplied overrides.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.overrides
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn build(self) -> TokenTable {
        let mut tokens = BTreeMap::new();
        for (name, value) in self
            .params
            .into_iter()
            .chain(self.builtins)
            .chain(self.overrides)
        {
            tokens.insert(name.to_ascii_uppercase(), value);
        }
        TokenTable { tokens }
    }
}

/// Replaces placeholders in every string inside `value`.
///
/// Objects and arrays are walked recursively; other scalars pass through.
/// An empty table returns `value` untouched without consulting the environment.
pub fn substitute<L>(value: Value, tokens: &TokenTable, env: &L) -> Value
where
    L: EnvLookup + ?Sized,
{
    if tokens.is_empty() {
        return value;
    }
    substitute_value(value, tokens, env)
}

fn substitute_value<L>(value: Value, tokens: &TokenTable, env: &L) -> Value
where
    L: EnvLookup + ?Sized,
{
    match value {
        Value::String(s) => Value::String(substitute_str(&s, tokens, env)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| substitute_value(item, tokens, env))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, substitute_value(v, tokens, env)))
                .collect::<Map<_, _>>(),
        ),
        other => other,
    }
}

/// Single left-to-right pass; replacement text is not rescanned.
fn substitute_str<L>(s: &str, tokens: &TokenTable, env: &L) -> String
where
    L: EnvLookup + ?Sized,
{
    placeholder()
        .replace_all(s, |caps: &Captures| {
            let name = caps[1].to_ascii_uppercase();
            if let Some(value) = tokens.get(&name) {
                return value.to_string();
            }
            if let Some(value) = env.var(&name) {
                return value;
            }
            trace!(token = %name, "leaving unresolved placeholder");
            caps[0].to_string()
        })
        .into_owned()
}
