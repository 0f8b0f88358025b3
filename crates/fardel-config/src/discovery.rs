//! File-based config discovery for CLI use
//!
//! Handles finding and loading fardel configuration files from the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::FardelConfig;
use crate::error::{ConfigError, Result};

/// File names probed in the root directory, in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &["fardel.toml", "fardel.json"];

/// File-based configuration discovery
///
/// Searches for fardel configuration files in conventional locations and loads them.
/// This is primarily for CLI use - library users should use `FardelConfig::from_value()` directly.
///
/// A loaded config without an explicit `context` gets the discovery root as
/// its context, so relative paths resolve next to the config file.
///
/// # Example
///
/// ```no_run
/// use fardel_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    /// Create a new config discovery with a root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. fardel.toml
    /// 2. fardel.json
    /// 3. package.json (fardel field)
    pub fn find(&self) -> Option<PathBuf> {
        for name in CONFIG_FILE_NAMES {
            let path = self.root.join(name);
            if path.exists() {
                return Some(path);
            }
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.exists() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed.get("fardel").is_some_and(|v| !v.is_null()) {
                        return Some(pkg_path);
                    }
                }
            }
        }

        None
    }

    /// Load config from discovered file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<FardelConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        self.load_from(&path)
    }

    /// Load config with profile merging
    pub fn load_with_profile(&self, profile: &str) -> Result<FardelConfig> {
        self.load()?.materialize_profile(Some(profile))
    }

    /// Load config from a specific file path
    pub fn load_from(&self, path: &Path) -> Result<FardelConfig> {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let content = fs::read_to_string(path)?;

        let value = if file_name == "package.json" {
            package_json_section(&content)?
        } else {
            match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => toml::from_str::<Value>(&content).map_err(|e| {
                    ConfigError::InvalidValue {
                        field: "toml".to_string(),
                        hint: Some(format!("Invalid TOML syntax: {}", e)),
                    }
                })?,
                Some("json") => serde_json::from_str::<Value>(&content).map_err(|e| {
                    ConfigError::InvalidValue {
                        field: "json".to_string(),
                        hint: Some(format!("Invalid JSON: {}", e)),
                    }
                })?,
                other => {
                    return Err(ConfigError::UnsupportedFormat(
                        other.unwrap_or("<none>").to_string(),
                    ))
                }
            }
        };

        let mut config = FardelConfig::from_value(value)?;
        let config_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        config.context = Some(config.context_or(&config_dir));

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

fn package_json_section(content: &str) -> Result<Value> {
    let parsed: Value = serde_json::from_str(content).map_err(|e| ConfigError::InvalidValue {
        field: "package.json".to_string(),
        hint: Some(format!("Invalid JSON: {}", e)),
    })?;

    match parsed.get("fardel") {
        Some(Value::Null) => Err(ConfigError::InvalidValue {
            field: "fardel".to_string(),
            hint: Some("The 'fardel' field cannot be null".to_string()),
        }),
        Some(section) => Ok(section.clone()),
        None => Err(ConfigError::InvalidValue {
            field: "fardel".to_string(),
            hint: Some("Add a 'fardel' field to your package.json".to_string()),
        }),
    }
}

/// Discover and load config from current directory (convenience function)
pub fn discover() -> Result<FardelConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load()
}

/// Discover and load config with profile (convenience function)
pub fn discover_with_profile(profile: &str) -> Result<FardelConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load_with_profile(profile)
}
