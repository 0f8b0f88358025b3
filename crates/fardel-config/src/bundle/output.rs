use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::bundle::helpers::{
    default_extensions, default_filename, default_hash_length, default_modules,
    default_output_path,
};

/// Where and how chunk files are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputOptions {
    /// Output directory, relative to the context
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Filename template for entry chunks.
    ///
    /// Supports `[name]`, `[id]`, `[chunkhash]`, `[contenthash]` and `[hash]`,
    /// each hash optionally truncated with `[chunkhash:8]`.
    #[serde(default = "default_filename")]
    pub filename: String,

    /// Prefix prepended to every URL that points into the output directory
    #[serde(default)]
    pub public_path: String,

    /// Length of the hex digest substituted for hash placeholders
    #[serde(default = "default_hash_length")]
    pub hash_length: usize,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            filename: default_filename(),
            public_path: String::new(),
            hash_length: default_hash_length(),
        }
    }
}

impl OutputOptions {
    /// True when the filename template distinguishes one chunk from another.
    pub fn filename_is_chunk_specific(&self) -> bool {
        is_chunk_specific(&self.filename)
    }
}

pub(crate) fn is_chunk_specific(template: &str) -> bool {
    ["[name", "[id", "[chunkhash", "[contenthash"]
        .iter()
        .any(|token| template.contains(token))
}

/// Module resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Extensions tried, in order, when a request has none
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directories searched for bare requests, walking up from the importer
    #[serde(default = "default_modules")]
    pub modules: Vec<PathBuf>,

    /// Request prefixes rewritten to context-relative directories
    /// (e.g., "@components" → "src/components")
    #[serde(default)]
    pub alias: IndexMap<String, PathBuf>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            modules: default_modules(),
            alias: IndexMap::new(),
        }
    }
}
