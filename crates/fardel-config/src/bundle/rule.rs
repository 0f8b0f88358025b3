use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// One entry of the ordered rule table.
///
/// A file is matched against rules in declaration order and the first match
/// decides its loader chain. `exclude` wins over `include` and `test`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Regular expression matched against the module's path
    pub test: String,

    /// Directories (relative to the context) a file must live under
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<PathBuf>,

    /// Directories (relative to the context) a file must not live under
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<PathBuf>,

    /// Loader chain, applied right to left
    #[serde(default, rename = "use", skip_serializing_if = "Vec::is_empty")]
    pub uses: Vec<LoaderSpec>,

    /// Single-loader shorthand, appended after `use`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader: Option<String>,

    /// Options for the `loader` shorthand
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,

    /// Route the chain's stylesheet output to the extract-css plugin
    #[serde(default)]
    pub extract: bool,

    /// Loader applied on top of the chain when no extract-css plugin is active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<LoaderSpec>,
}

impl Rule {
    /// Create a rule matching `test` with the given loader chain.
    pub fn new<I, S>(test: impl Into<String>, uses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            test: test.into(),
            include: Vec::new(),
            exclude: Vec::new(),
            uses: uses
                .into_iter()
                .map(|s| LoaderSpec::Short(s.into()))
                .collect(),
            loader: None,
            options: Value::Null,
            extract: false,
            fallback: None,
        }
    }

    /// Restrict the rule to files under `dir`.
    pub fn include(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include.push(dir.into());
        self
    }

    /// Exclude files under `dir`.
    pub fn exclude(mut self, dir: impl Into<PathBuf>) -> Self {
        self.exclude.push(dir.into());
        self
    }

    /// Mark the rule as extractable with a fallback loader.
    pub fn extract_with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.extract = true;
        self.fallback = Some(LoaderSpec::Short(fallback.into()));
        self
    }

    /// The full loader chain in declaration order (leftmost first).
    pub fn chain(&self) -> Result<Vec<LoaderRef>> {
        let mut chain = self
            .uses
            .iter()
            .map(LoaderSpec::resolve)
            .collect::<Result<Vec<_>>>()?;

        if let Some(name) = &self.loader {
            let shorthand = LoaderSpec::Full {
                loader: name.clone(),
                options: self.options.clone(),
            };
            chain.push(shorthand.resolve()?);
        }

        Ok(chain)
    }
}

/// A loader reference as written in the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoaderSpec {
    /// `"css-loader"` or `"css-loader?minimize"`
    Short(String),
    /// `{ loader = "html-loader", options = { minimize = true } }`
    Full {
        loader: String,
        #[serde(default)]
        options: Value,
    },
}

/// A resolved loader: its name plus an options object.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderRef {
    pub name: String,
    pub options: Map<String, Value>,
}

impl LoaderRef {
    pub fn flag(&self, key: &str) -> bool {
        match self.options.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
            _ => false,
        }
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }
}

impl LoaderSpec {
    /// Parse the spec into a name and an options object.
    pub fn resolve(&self) -> Result<LoaderRef> {
        match self {
            LoaderSpec::Short(spec) => parse_loader_string(spec),
            LoaderSpec::Full { loader, options } => {
                let name = loader.trim();
                if name.is_empty() {
                    return Err(ConfigError::InvalidLoader {
                        spec: loader.clone(),
                        message: "loader name is empty".to_string(),
                    });
                }
                let options = match options {
                    Value::Null => Map::new(),
                    Value::Object(map) => map.clone(),
                    other => {
                        return Err(ConfigError::InvalidLoader {
                            spec: loader.clone(),
                            message: format!("options must be a table, got {other}"),
                        })
                    }
                };
                Ok(LoaderRef {
                    name: name.to_string(),
                    options,
                })
            }
        }
    }
}

/// Parse `name?query` loader strings.
///
/// The query is either a JSON object (`?{"minimize":true}`) or `&`-separated
/// pairs where a bare key means `true` and values that parse as JSON scalars
/// keep their type.
pub fn parse_loader_string(spec: &str) -> Result<LoaderRef> {
    let (name, query) = match spec.split_once('?') {
        Some((name, query)) => (name.trim(), Some(query)),
        None => (spec.trim(), None),
    };

    if name.is_empty() {
        return Err(ConfigError::InvalidLoader {
            spec: spec.to_string(),
            message: "loader name is empty".to_string(),
        });
    }

    let mut options = Map::new();
    if let Some(query) = query {
        let query = query.trim();
        if query.starts_with('{') {
            match serde_json::from_str::<Value>(query) {
                Ok(Value::Object(map)) => options = map,
                Ok(_) | Err(_) => {
                    return Err(ConfigError::InvalidLoader {
                        spec: spec.to_string(),
                        message: "query must be a JSON object".to_string(),
                    })
                }
            }
        } else {
            for pair in query.split('&').filter(|p| !p.is_empty()) {
                let (key, value) = match pair.split_once('=') {
                    Some((key, value)) => (key, scalar(value)),
                    None => (pair, Value::Bool(true)),
                };
                options.insert(key.to_string(), value);
            }
        }
    }

    Ok(LoaderRef {
        name: name.to_string(),
        options,
    })
}

fn scalar(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}
