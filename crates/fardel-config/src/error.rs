//! Error types for configuration validation and loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Filesystem validation errors (for CLI use)
    #[error("entry '{name}' not found: {}", .path.display())]
    EntryNotFound { name: String, path: PathBuf },

    #[error("html template not found: {}", .path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("rule include directory not found: {}", .path.display())]
    IncludeDirNotFound { path: PathBuf },

    // Config parsing/loading errors
    #[error("config not found")]
    NotFound,

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid config value for '{field}'{}", format_hint(.hint))]
    InvalidValue { field: String, hint: Option<String> },

    #[error("invalid profile override: {message}")]
    InvalidProfileOverride { message: String },

    // Schema validation errors (no filesystem checks)
    #[error("no entries specified")]
    NoEntries,

    #[error("schema validation failed: {message}{}", format_hint(.hint))]
    SchemaValidation {
        message: String,
        hint: Option<String>,
    },

    #[error("invalid loader '{spec}': {message}")]
    InvalidLoader { spec: String, message: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn schema(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::SchemaValidation {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }
}

fn format_hint(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!(" ({hint})"),
        None => String::new(),
    }
}
