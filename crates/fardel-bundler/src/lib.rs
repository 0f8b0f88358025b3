//! # fardel-bundler
//!
//! The build pass behind the `fardel` CLI: resolve declared entries, dispatch
//! every reachable file to a loader chain by the first matching rule, group
//! modules into chunks, run the plugin steps and write hashed output files.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fardel_bundler::Bundler;
//! use fardel_config::FardelConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FardelConfig::default()
//!     .with_entry("index", "src/index.js");
//!
//! let result = Bundler::new(config)?.build()?;
//! for asset in &result.assets {
//!     println!("{} ({} bytes)", asset.filename, asset.size);
//! }
//! # Ok(()) }
//! ```

pub mod bundler;
pub mod chunk;
pub mod compilation;
pub mod graph;
pub mod hash;
pub mod loaders;
pub mod markup;
pub mod minify;
pub mod output;
pub mod plugins;
pub mod resolve;
pub mod rules;
pub mod runtime;
pub mod script;
pub mod template;

pub use bundler::{BuildResult, Bundler, ChunkSummary, EmittedAsset};
pub use chunk::{Chunk, ChunkSet};
pub use compilation::{Asset, AssetKind, Compilation};
pub use graph::{Module, ModuleGraph, ModuleKind};
pub use plugins::{Plugin, PluginPhase, PluginRegistry};
pub use resolve::Resolver;
pub use rules::{Ambiguity, CompiledRule, Dispatch, NativeKind, RuleSet};

/// Error types for fardel-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] fardel_config::ConfigError),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A request could not be resolved to a file.
    #[error("Cannot resolve '{request}' from {importer}")]
    ResolutionFailed { request: String, importer: String },

    /// No rule matched a file that is not natively understood.
    #[error("No rule matches {}", .path.display())]
    NoMatchingRule { path: std::path::PathBuf },

    /// A rule names a loader that is not built in.
    #[error("Unknown loader '{name}'")]
    UnknownLoader { name: String },

    /// A loader failed on a file.
    #[error("{loader} failed on {file}: {message}")]
    Loader {
        loader: String,
        file: String,
        message: String,
    },

    /// A plugin step failed.
    #[error("Plugin '{plugin}' failed: {message}")]
    Plugin { plugin: String, message: String },

    /// Two emitted files resolved to the same name.
    #[error("Output collision: '{filename}' is produced by both {first} and {second}")]
    OutputCollision {
        filename: String,
        first: String,
        second: String,
    },

    /// A filename template could not be rendered.
    #[error("Invalid filename template '{template}': {message}")]
    Template { template: String, message: String },

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for fardel-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn loader(loader: &str, file: &std::path::Path, message: impl Into<String>) -> Self {
        Error::Loader {
            loader: loader.to_string(),
            file: file.display().to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn plugin(plugin: &str, message: impl Into<String>) -> Self {
        Error::Plugin {
            plugin: plugin.to_string(),
            message: message.into(),
        }
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::ResolutionFailed { .. } => "RESOLUTION_FAILED",
            Error::NoMatchingRule { .. } => "NO_MATCHING_RULE",
            Error::UnknownLoader { .. } => "UNKNOWN_LOADER",
            Error::Loader { .. } => "LOADER_ERROR",
            Error::Plugin { .. } => "PLUGIN_ERROR",
            Error::OutputCollision { .. } => "OUTPUT_COLLISION",
            Error::Template { .. } => "TEMPLATE_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::Io(_) => "IO_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::ResolutionFailed { request, .. } => Some(Box::new(format!(
                "Check that '{}' exists, or add a resolve.alias / resolve.modules entry for it.",
                request
            ))),
            Error::NoMatchingRule { .. } => Some(Box::new(
                "Add a [[rules]] entry whose `test` matches this file type.",
            )),
            Error::UnknownLoader { .. } => Some(Box::new(
                "Built-in loaders: css-loader, style-loader, html-loader, file-loader, raw-loader.",
            )),
            Error::OutputCollision { .. } => Some(Box::new(
                "Include [name], [id] or [chunkhash] in the filename template.",
            )),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it's within the project directory and doesn't contain '..' components.",
                path
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            _ => None,
        }
    }
}
