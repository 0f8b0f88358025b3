use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::bundle::helpers::{
    default_compression_asset, default_css_filename, default_html_filename, default_min_ratio,
    default_report_filename, default_true,
};

/// A declared plugin step.
///
/// The `name` field selects the step; the remaining fields are that step's
/// options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginOptions {
    /// Whether the plugin should run
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Profile-specific overrides, merged over this plugin's options
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub profiles: HashMap<String, Value>,

    #[serde(flatten)]
    pub kind: PluginKind,
}

impl PluginOptions {
    pub fn new(kind: PluginKind) -> Self {
        Self {
            enabled: true,
            profiles: HashMap::new(),
            kind,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

impl From<PluginKind> for PluginOptions {
    fn from(kind: PluginKind) -> Self {
        Self::new(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum PluginKind {
    Clean(CleanOptions),
    Define(DefineOptions),
    Ignore(IgnoreOptions),
    Commons(CommonsOptions),
    ExtractCss(ExtractCssOptions),
    Minify(MinifyOptions),
    Html(HtmlOptions),
    Compression(CompressionOptions),
    Analyzer(AnalyzerOptions),
}

impl PluginKind {
    pub fn name(&self) -> &'static str {
        match self {
            PluginKind::Clean(_) => "clean",
            PluginKind::Define(_) => "define",
            PluginKind::Ignore(_) => "ignore",
            PluginKind::Commons(_) => "commons",
            PluginKind::ExtractCss(_) => "extract-css",
            PluginKind::Minify(_) => "minify",
            PluginKind::Html(_) => "html",
            PluginKind::Compression(_) => "compression",
            PluginKind::Analyzer(_) => "analyzer",
        }
    }
}

/// Remove paths (relative to the context) before the build writes anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanOptions {
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

/// Compile-time constant replacement.
///
/// Values are source text: `'"production"'` substitutes a string literal.
/// Nested tables flatten to dotted keys, so
/// `{ "process.env" = { NODE_ENV = '"production"' } }` defines
/// `process.env.NODE_ENV`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefineOptions {
    #[serde(default)]
    pub definitions: Map<String, Value>,
}

impl DefineOptions {
    /// Flatten nested definitions into `(dotted.key, replacement)` pairs.
    pub fn flatten(&self) -> IndexMap<String, String> {
        let mut out = IndexMap::new();
        for (key, value) in &self.definitions {
            flatten_into(key, value, &mut out);
        }
        out
    }
}

fn flatten_into(prefix: &str, value: &Value, out: &mut IndexMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(&format!("{prefix}.{key}"), nested, out);
            }
        }
        Value::String(code) => {
            out.insert(prefix.to_string(), code.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

/// Skip requests matching `resource` when the importer's directory matches `context`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IgnoreOptions {
    pub resource: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Hoist a named entry plus shared modules into one commons chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonsOptions {
    /// Entry whose chunk becomes the commons chunk
    pub name: String,

    /// Filename template for the commons chunk (defaults to `output.filename`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Minimum number of entry chunks that must share a module (defaults to all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_chunks: Option<usize>,
}

/// Write extracted stylesheets to separate files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractCssOptions {
    #[serde(default = "default_css_filename")]
    pub filename: String,
}

impl Default for ExtractCssOptions {
    fn default() -> Self {
        Self {
            filename: default_css_filename(),
        }
    }
}

/// Minify emitted scripts and stylesheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinifyOptions {
    #[serde(default = "default_true")]
    pub js: bool,

    #[serde(default = "default_true")]
    pub css: bool,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self { js: true, css: true }
    }
}

/// Emit an HTML page referencing a set of chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtmlOptions {
    /// Template path relative to the context; a built-in page is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    /// Output filename relative to the output directory
    #[serde(default = "default_html_filename")]
    pub filename: String,

    /// Entry names whose chunks are injected (all entries when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<String>>,

    #[serde(default)]
    pub inject: Inject,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub minify: HtmlMinifyOptions,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            template: None,
            filename: default_html_filename(),
            chunks: None,
            inject: Inject::default(),
            title: None,
            minify: HtmlMinifyOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlMinifyOptions {
    #[serde(default)]
    pub remove_comments: bool,

    #[serde(default)]
    pub collapse_whitespace: bool,
}

/// Where script tags go. `true` means body, `false` disables injection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "InjectRepr", into = "InjectRepr")]
pub enum Inject {
    #[default]
    Body,
    Head,
    Disabled,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum InjectRepr {
    Flag(bool),
    Place(String),
}

impl TryFrom<InjectRepr> for Inject {
    type Error = String;

    fn try_from(repr: InjectRepr) -> Result<Self, Self::Error> {
        match repr {
            InjectRepr::Flag(true) => Ok(Inject::Body),
            InjectRepr::Flag(false) => Ok(Inject::Disabled),
            InjectRepr::Place(place) => match place.as_str() {
                "body" => Ok(Inject::Body),
                "head" => Ok(Inject::Head),
                other => Err(format!(
                    "invalid inject position '{other}', expected \"body\", \"head\", true or false"
                )),
            },
        }
    }
}

impl From<Inject> for InjectRepr {
    fn from(inject: Inject) -> Self {
        match inject {
            Inject::Body => InjectRepr::Place("body".to_string()),
            Inject::Head => InjectRepr::Place("head".to_string()),
            Inject::Disabled => InjectRepr::Flag(false),
        }
    }
}

/// Emit pre-compressed variants of matching assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionOptions {
    /// Target filename template: `[path]`, `[file]`, `[query]`
    #[serde(default = "default_compression_asset")]
    pub asset: String,

    #[serde(default)]
    pub algorithm: CompressionAlgorithm,

    /// Regex selecting assets by filename (all assets when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,

    /// Minimum asset size in bytes
    #[serde(default)]
    pub threshold: u64,

    /// Variants whose compressed/original ratio exceeds this are dropped
    #[serde(default = "default_min_ratio")]
    pub min_ratio: f64,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            asset: default_compression_asset(),
            algorithm: CompressionAlgorithm::default(),
            test: None,
            threshold: 0,
            min_ratio: default_min_ratio(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    #[default]
    Gzip,
    Deflate,
}

/// Write a size report of chunks and modules after emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerOptions {
    #[serde(default = "default_report_filename")]
    pub report_filename: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_filename: Option<String>,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            report_filename: default_report_filename(),
            stats_filename: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plugin_is_selected_by_name() {
        let plugin: PluginOptions = serde_json::from_value(json!({
            "name": "clean",
            "paths": ["build"]
        }))
        .unwrap();

        assert!(plugin.enabled);
        assert_eq!(
            plugin.kind,
            PluginKind::Clean(CleanOptions {
                paths: vec![PathBuf::from("build")]
            })
        );
    }

    #[test]
    fn disabled_plugin_keeps_options() {
        let plugin: PluginOptions = serde_json::from_value(json!({
            "name": "analyzer",
            "enabled": false
        }))
        .unwrap();

        assert!(!plugin.enabled);
        assert_eq!(plugin.name(), "analyzer");
    }

    #[test]
    fn unknown_plugin_is_rejected() {
        let result = serde_json::from_value::<PluginOptions>(json!({ "name": "hot-reload" }));
        assert!(result.is_err());
    }

    #[test]
    fn define_flattens_nested_tables() {
        let define: DefineOptions = serde_json::from_value(json!({
            "definitions": {
                "process.env": { "NODE_ENV": "\"production\"" },
                "DEBUG": false
            }
        }))
        .unwrap();

        let flat = define.flatten();
        assert_eq!(flat["process.env.NODE_ENV"], "\"production\"");
        assert_eq!(flat["DEBUG"], "false");
    }

    #[test]
    fn inject_accepts_bools_and_positions() {
        let html: HtmlOptions = serde_json::from_value(json!({ "inject": "head" })).unwrap();
        assert_eq!(html.inject, Inject::Head);

        let html: HtmlOptions = serde_json::from_value(json!({ "inject": false })).unwrap();
        assert_eq!(html.inject, Inject::Disabled);

        let html: HtmlOptions = serde_json::from_value(json!({ "inject": true })).unwrap();
        assert_eq!(html.inject, Inject::Body);

        assert!(serde_json::from_value::<HtmlOptions>(json!({ "inject": "footer" })).is_err());
    }

    #[test]
    fn compression_defaults() {
        let opts = CompressionOptions::default();
        assert_eq!(opts.asset, "[path].gz[query]");
        assert_eq!(opts.algorithm, CompressionAlgorithm::Gzip);
        assert_eq!(opts.threshold, 0);
        assert!((opts.min_ratio - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn plugin_round_trips_through_value() {
        let plugin = PluginOptions::new(PluginKind::ExtractCss(ExtractCssOptions {
            filename: "css/[name]-[chunkhash].css".to_string(),
        }));
        let value = serde_json::to_value(&plugin).unwrap();
        assert_eq!(value["name"], json!("extract-css"));
        let back: PluginOptions = serde_json::from_value(value).unwrap();
        assert_eq!(back, plugin);
    }
}
