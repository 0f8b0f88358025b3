//! Layered loading: defaults < config file < environment < CLI.
//!
//! The config file is parsed directly so entry and rule order survive; the
//! scalar overrides that can come from the environment or the command line
//! are layered with figment and applied on top.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::config::{FardelConfig, Mode};
use crate::discovery::ConfigDiscovery;
use crate::error::{ConfigError, Result};

/// Environment variable prefix for overrides (`FARDEL_MODE`, ...).
pub const ENV_PREFIX: &str = "FARDEL_";

/// Values that may override the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Merge `FARDEL_*` environment variables under the given CLI values.
    pub fn with_env(cli: ConfigOverrides) -> Result<Self> {
        Figment::new()
            .merge(Env::prefixed(ENV_PREFIX).only(&["mode", "profile", "context", "output_path"]))
            .merge(Serialized::defaults(cli))
            .extract()
            .map_err(|e| ConfigError::InvalidValue {
                field: "environment".to_string(),
                hint: Some(e.to_string()),
            })
    }

    /// The profile to materialize: explicit, else the one named after the mode.
    pub fn profile_for(&self, config: &FardelConfig) -> String {
        self.profile
            .clone()
            .unwrap_or_else(|| config.mode.as_str().to_string())
    }
}

impl FardelConfig {
    /// Apply scalar overrides in place.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(mode) = overrides.mode {
            self.mode = mode;
        }
        if let Some(context) = &overrides.context {
            self.context = Some(context.clone());
        }
        if let Some(path) = &overrides.output_path {
            self.output.path = path.clone();
        }
    }
}

/// Load the config for a build.
///
/// Reads `explicit` if given, otherwise discovers a config in `root`. Then
/// environment and CLI overrides are applied, and the active profile (the
/// `--profile` value, else the mode name) is merged in.
pub fn load_config(
    root: &Path,
    explicit: Option<&Path>,
    cli: ConfigOverrides,
) -> Result<FardelConfig> {
    let overrides = ConfigOverrides::with_env(cli)?;
    let discovery = ConfigDiscovery::new(root);

    let mut config = match explicit {
        Some(path) => {
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                root.join(path)
            };
            if !path.exists() {
                return Err(ConfigError::NotFound);
            }
            discovery.load_from(&path)?
        }
        None => discovery.load()?,
    };

    config.apply_overrides(&overrides);
    let profile = overrides.profile_for(&config);
    let mut config = config.materialize_profile(Some(&profile))?;

    // A profile may not switch the mode away from an explicit override.
    config.apply_overrides(&overrides);

    tracing::debug!(mode = %config.mode, profile = %profile, "resolved configuration");
    Ok(config)
}
