//! High-level configuration structure for fardel.
//!
//! This module provides the main `FardelConfig` struct and profile merging logic.
//! For file discovery, see the `discovery` module.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bundle::{EntrySpec, OutputOptions, PluginOptions, ResolveOptions, Rule};
use crate::error::{ConfigError, Result as ConfigResult};
use crate::settings::GlobalSettings;

/// Build mode. Production enables minification and defines
/// `process.env.NODE_ENV` as `"production"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Production,
    Development,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Production => "production",
            Mode::Development => "development",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Mode::Production)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Mode::Production),
            "development" | "dev" => Ok(Mode::Development),
            other => Err(ConfigError::InvalidValue {
                field: "mode".to_string(),
                hint: Some(format!(
                    "'{other}' is not a mode, expected production or development"
                )),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FardelConfig {
    #[serde(default)]
    pub mode: Mode,

    /// Project root; relative paths in the config resolve against it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<PathBuf>,

    /// Named entry points, in declaration order
    #[serde(default)]
    pub entries: IndexMap<String, EntrySpec>,

    #[serde(default)]
    pub output: OutputOptions,

    #[serde(default)]
    pub resolve: ResolveOptions,

    /// Ordered rule table; the first matching rule wins
    #[serde(default)]
    pub rules: Vec<Rule>,

    /// Ordered plugin steps
    #[serde(default)]
    pub plugins: Vec<PluginOptions>,

    /// Force minification on or off regardless of mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimize: Option<bool>,

    /// Partial configs merged over the base when selected
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub profiles: IndexMap<String, Value>,

    #[serde(default)]
    pub settings: GlobalSettings,
}

impl FardelConfig {
    /// Create from serde_json::Value (for programmatic config)
    ///
    /// # Example
    ///
    /// ```
    /// use fardel_config::{EntrySpec, FardelConfig};
    /// use serde_json::json;
    ///
    /// let value = json!({
    ///     "entries": { "index": "src/index.js" },
    ///     "output": { "filename": "js/[name]-[chunkhash].js" }
    /// });
    ///
    /// let config = FardelConfig::from_value(value).unwrap();
    /// assert_eq!(config.entries["index"], EntrySpec::Path("src/index.js".into()));
    /// ```
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Convert to serde_json::Value
    pub fn to_value(&self) -> ConfigResult<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Whether emitted assets are minified.
    pub fn effective_minimize(&self) -> bool {
        self.minimize.unwrap_or(self.mode.is_production())
    }

    /// The context directory, or `fallback` when none was configured.
    pub fn context_or(&self, fallback: &Path) -> PathBuf {
        match &self.context {
            Some(ctx) if ctx.is_absolute() => ctx.clone(),
            Some(ctx) => fallback.join(ctx),
            None => fallback.to_path_buf(),
        }
    }

    /// Add an entry, replacing any entry with the same name.
    pub fn with_entry(mut self, name: impl Into<String>, spec: impl Into<EntrySpec>) -> Self {
        self.entries.insert(name.into(), spec.into());
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_plugin(mut self, plugin: impl Into<PluginOptions>) -> Self {
        self.plugins.push(plugin.into());
        self
    }
}

impl FardelConfig {
    /// Merge the named profile over the base config.
    ///
    /// Objects merge recursively; arrays and scalars are replaced. Each
    /// plugin's own `profiles` block is applied afterwards. Unknown profile
    /// names leave the config untouched.
    pub fn materialize_profile(mut self, profile: Option<&str>) -> ConfigResult<Self> {
        let Some(name) = profile else {
            return Ok(self);
        };

        if let Some(overrides) = self.profiles.get(name).cloned() {
            if !overrides.is_null() {
                let profiles = std::mem::take(&mut self.profiles);
                let mut base = serde_json::to_value(&self).map_err(|err| {
                    ConfigError::InvalidProfileOverride {
                        message: err.to_string(),
                    }
                })?;
                merge_values(&mut base, &overrides);
                self = serde_json::from_value(base).map_err(|err| {
                    ConfigError::InvalidProfileOverride {
                        message: format!("profile '{name}': {err}"),
                    }
                })?;
                self.profiles = profiles;
            }
            tracing::debug!(profile = name, "applied config profile");
        }

        apply_plugin_profiles(&mut self.plugins, name)?;

        Ok(self)
    }
}

pub(crate) fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

fn apply_plugin_profiles(plugins: &mut [PluginOptions], profile: &str) -> ConfigResult<()> {
    for plugin in plugins {
        let Some(overrides) = plugin.profiles.get(profile).cloned() else {
            continue;
        };

        if overrides.is_null() {
            continue;
        }

        let original_profiles = plugin.profiles.clone();
        let mut merged =
            serde_json::to_value(&*plugin).map_err(|err| ConfigError::InvalidProfileOverride {
                message: err.to_string(),
            })?;
        merge_values(&mut merged, &overrides);
        let mut updated: PluginOptions =
            serde_json::from_value(merged).map_err(|err| ConfigError::InvalidProfileOverride {
                message: err.to_string(),
            })?;
        updated.profiles = original_profiles;
        *plugin = updated;
    }

    Ok(())
}
