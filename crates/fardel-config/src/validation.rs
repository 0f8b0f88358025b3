//! Pluggable config validation strategies
//!
//! Separates filesystem validation (for CLI use) from schema validation (for library use).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::bundle::{is_chunk_specific, EntrySpec, PluginKind};
use crate::config::FardelConfig;
use crate::error::{ConfigError, Result};

/// Trait for pluggable config validation strategies
pub trait ConfigValidator {
    /// Validate a full configuration
    fn validate(&self, config: &FardelConfig) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// # Example
///
/// ```
/// use fardel_config::{ConfigValidator, FardelConfig, SchemaValidator};
///
/// let config = FardelConfig::default().with_entry("index", "src/index.js");
/// SchemaValidator.validate(&config).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &FardelConfig) -> Result<()> {
        validate_entries(config)?;
        validate_output(config)?;
        validate_rules(config)?;
        validate_plugins(config)?;
        Ok(())
    }
}

fn validate_entries(config: &FardelConfig) -> Result<()> {
    if config.entries.is_empty() {
        return Err(ConfigError::NoEntries);
    }

    for (name, spec) in &config.entries {
        if name.trim().is_empty() {
            return Err(ConfigError::schema(
                "entry names cannot be empty",
                "Give every entry a non-empty name",
            ));
        }
        match spec {
            EntrySpec::Path(path) if path.trim().is_empty() => {
                return Err(ConfigError::schema(
                    format!("entry '{name}' has an empty path"),
                    "Point the entry at a source file",
                ));
            }
            EntrySpec::Many(items) if items.is_empty() => {
                return Err(ConfigError::schema(
                    format!("entry '{name}' lists no modules"),
                    "Add at least one module request to the list",
                ));
            }
            EntrySpec::Many(items) if items.iter().any(|i| i.trim().is_empty()) => {
                return Err(ConfigError::schema(
                    format!("entry '{name}' contains an empty module request"),
                    "Remove empty strings from the list",
                ));
            }
            _ => {}
        }
    }

    Ok(())
}

fn validate_output(config: &FardelConfig) -> Result<()> {
    let output = &config.output;

    if output.filename.trim().is_empty() {
        return Err(ConfigError::schema(
            "output.filename cannot be empty",
            "Use a template such as \"[name].js\"",
        ));
    }

    if config.entries.len() > 1 && !output.filename_is_chunk_specific() {
        return Err(ConfigError::schema(
            format!(
                "output.filename \"{}\" gives every entry the same name",
                output.filename
            ),
            "Include [name], [id], [chunkhash] or [contenthash] in the template",
        ));
    }

    if !(4..=64).contains(&output.hash_length) {
        return Err(ConfigError::schema(
            format!("output.hash_length {} is out of range", output.hash_length),
            "Use a hash length between 4 and 64",
        ));
    }

    Ok(())
}

fn validate_rules(config: &FardelConfig) -> Result<()> {
    for (index, rule) in config.rules.iter().enumerate() {
        compile_regex(&format!("rules[{index}].test"), &rule.test)?;

        let chain = rule.chain()?;
        if rule.extract && chain.is_empty() {
            return Err(ConfigError::schema(
                format!("rules[{index}] extracts but has no loaders"),
                "Add a stylesheet loader such as \"css-loader\" to `use`",
            ));
        }
        if rule.extract && rule.fallback.is_none() {
            return Err(ConfigError::schema(
                format!("rules[{index}] extracts but names no fallback"),
                "Set fallback = \"style-loader\"",
            ));
        }
        if let Some(fallback) = &rule.fallback {
            fallback.resolve()?;
        }
    }

    Ok(())
}

fn validate_plugins(config: &FardelConfig) -> Result<()> {
    let mut html_files = HashSet::new();

    for plugin in config.plugins.iter().filter(|p| p.enabled) {
        match &plugin.kind {
            PluginKind::Clean(opts) => {
                for path in &opts.paths {
                    if path.as_os_str().is_empty() {
                        return Err(ConfigError::schema(
                            "clean paths cannot be empty",
                            "Remove empty strings from `paths`",
                        ));
                    }
                }
            }
            PluginKind::Define(opts) => {
                for key in opts.flatten().keys() {
                    if key.trim().is_empty() {
                        return Err(ConfigError::schema(
                            "define keys cannot be empty",
                            "Name every definition",
                        ));
                    }
                }
            }
            PluginKind::Ignore(opts) => {
                compile_regex("ignore.resource", &opts.resource)?;
                if let Some(context) = &opts.context {
                    compile_regex("ignore.context", context)?;
                }
            }
            PluginKind::Commons(opts) => {
                if !config.entries.contains_key(&opts.name) {
                    return Err(ConfigError::schema(
                        format!("commons chunk '{}' is not a declared entry", opts.name),
                        "Name one of the keys under [entries]",
                    ));
                }
                if opts.min_chunks == Some(0) {
                    return Err(ConfigError::schema(
                        "commons min_chunks must be at least 1",
                        "Omit min_chunks to require every entry",
                    ));
                }
            }
            PluginKind::ExtractCss(opts) => {
                if config.entries.len() > 1 && !is_chunk_specific(&opts.filename) {
                    return Err(ConfigError::schema(
                        format!("extract-css filename \"{}\" is not per-chunk", opts.filename),
                        "Include [name], [id], [chunkhash] or [contenthash]",
                    ));
                }
            }
            PluginKind::Minify(_) | PluginKind::Analyzer(_) => {}
            PluginKind::Html(opts) => {
                if !html_files.insert(opts.filename.clone()) {
                    return Err(ConfigError::schema(
                        format!("two html plugins write \"{}\"", opts.filename),
                        "Give every page a distinct filename",
                    ));
                }
                for chunk in opts.chunks.iter().flatten() {
                    if !config.entries.contains_key(chunk) {
                        return Err(ConfigError::schema(
                            format!("html page \"{}\" references unknown chunk '{chunk}'", opts.filename),
                            "Chunk names must match entry names",
                        ));
                    }
                }
            }
            PluginKind::Compression(opts) => {
                if !(0.0..=1.0).contains(&opts.min_ratio) {
                    return Err(ConfigError::schema(
                        format!("compression min_ratio {} is out of range", opts.min_ratio),
                        "Use a ratio between 0 and 1",
                    ));
                }
                if let Some(test) = &opts.test {
                    compile_regex("compression.test", test)?;
                }
                if !opts.asset.contains("[path]") && !opts.asset.contains("[file]") {
                    return Err(ConfigError::schema(
                        format!("compression asset \"{}\" drops the source name", opts.asset),
                        "Use a template such as \"[path].gz[query]\"",
                    ));
                }
            }
        }
    }

    Ok(())
}

fn compile_regex(field: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        hint: Some(e.to_string()),
    })
}

/// Filesystem validator (for CLI use)
///
/// Runs schema validation, then checks that file entries, rule include
/// directories and html templates exist under the context.
pub struct FsValidator {
    root: PathBuf,
}

impl FsValidator {
    /// Create a new filesystem validator with a context directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &FardelConfig) -> Result<()> {
        SchemaValidator.validate(config)?;

        for (name, spec) in &config.entries {
            // Vendor lists name packages, which only the resolver can locate.
            if let EntrySpec::Path(path) = spec {
                let path = self.root.join(path);
                if !path.exists() {
                    return Err(ConfigError::EntryNotFound {
                        name: name.clone(),
                        path,
                    });
                }
            }
        }

        for rule in &config.rules {
            for dir in &rule.include {
                let path = self.root.join(dir);
                if !path.is_dir() {
                    return Err(ConfigError::IncludeDirNotFound { path });
                }
            }
        }

        for plugin in config.plugins.iter().filter(|p| p.enabled) {
            if let PluginKind::Html(opts) = &plugin.kind {
                if let Some(template) = &opts.template {
                    let path = self.root.join(template);
                    if !path.is_file() {
                        return Err(ConfigError::TemplateNotFound { path });
                    }
                }
            }
        }

        Ok(())
    }
}

/// Convenience function for schema-only validation
pub fn validate_schema(config: &FardelConfig) -> Result<()> {
    SchemaValidator.validate(config)
}

/// Convenience function for filesystem validation
pub fn validate_fs(config: &FardelConfig, root: impl AsRef<Path>) -> Result<()> {
    FsValidator::new(root).validate(config)
}
