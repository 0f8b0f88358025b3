//! Filename template interpolation.
//!
//! Placeholders are `[key]` or `[key:N]`. Hash keys (`hash`, `chunkhash`,
//! `contenthash`) are truncated to `N`, or to the configured hash length when
//! no length is given. Unknown keys are left untouched; known keys with no
//! value for the asset being named are an error.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};

use crate::hash::shorten;
use crate::{Error, Result};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\w+)(?::(\d+))?\]").expect("placeholder regex is valid"));

const KNOWN_KEYS: &[&str] = &[
    "name",
    "id",
    "hash",
    "chunkhash",
    "contenthash",
    "ext",
    "path",
    "file",
    "query",
];

const HASH_KEYS: &[&str] = &["hash", "chunkhash", "contenthash"];

/// Values available to a template.
#[derive(Debug, Clone, Default)]
pub struct PathData {
    values: IndexMap<&'static str, String>,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }
}

/// Render `template` with `data`.
pub fn interpolate(template: &str, data: &PathData, hash_length: usize) -> Result<String> {
    let mut missing = None;

    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let key = &caps[1];
        if !KNOWN_KEYS.contains(&key) {
            return caps[0].to_string();
        }

        let Some(value) = data.values.get(key) else {
            missing.get_or_insert_with(|| key.to_string());
            return String::new();
        };

        if HASH_KEYS.contains(&key) {
            let len = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .unwrap_or(hash_length);
            shorten(value, len).to_string()
        } else {
            value.clone()
        }
    });

    if let Some(key) = missing {
        return Err(Error::Template {
            template: template.to_string(),
            message: format!("[{key}] is not available here"),
        });
    }

    Ok(rendered.into_owned())
}

/// True when the template contains any hash placeholder.
pub fn has_hash(template: &str) -> bool {
    PLACEHOLDER
        .captures_iter(template)
        .any(|caps| HASH_KEYS.contains(&&caps[1]))
}
