//! Plugin registry with execution phases.

use std::path::Path;

use fardel_config::{DefineOptions, FardelConfig, MinifyOptions, PluginKind};
use serde_json::Value;

use super::{
    AnalyzerPlugin, CleanPlugin, CommonsPlugin, CompressionPlugin, DefinePlugin,
    ExtractCssPlugin, HtmlPlugin, IgnorePlugin, MinifyPlugin, Plugin, PluginPhase,
};
use crate::Result;

const NODE_ENV: &str = "process.env.NODE_ENV";

/// Plugin registry that maintains plugins in phase order
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry for `config`.
    ///
    /// Disabled plugins are skipped. `process.env.NODE_ENV` is always
    /// defined from the mode unless a define plugin sets it, and a minify
    /// step is added when minimization is on and none was declared.
    pub fn from_config(config: &FardelConfig, context: &Path) -> Result<Self> {
        let mut registry = Self::new();
        let mut defines_node_env = false;
        let mut has_minify = false;

        for options in config.plugins.iter().filter(|p| p.enabled) {
            match &options.kind {
                PluginKind::Clean(o) => registry.add(CleanPlugin::new(o, context)),
                PluginKind::Define(o) => {
                    defines_node_env |= o.flatten().contains_key(NODE_ENV);
                    registry.add(DefinePlugin::new(o)?);
                }
                PluginKind::Ignore(o) => registry.add(IgnorePlugin::new(o)?),
                PluginKind::Commons(o) => registry.add(CommonsPlugin::new(o)),
                PluginKind::ExtractCss(o) => registry.add(ExtractCssPlugin::new(o)),
                PluginKind::Minify(o) => {
                    has_minify = true;
                    registry.add(MinifyPlugin::new(o));
                }
                PluginKind::Html(o) => registry.add(HtmlPlugin::new(o, context)),
                PluginKind::Compression(o) => registry.add(CompressionPlugin::new(o)?),
                PluginKind::Analyzer(o) => registry.add(AnalyzerPlugin::new(o)),
            }
        }

        if !defines_node_env {
            let mut define = DefineOptions::default();
            define.definitions.insert(
                NODE_ENV.to_string(),
                Value::String(format!("\"{}\"", config.mode.as_str())),
            );
            registry.add(DefinePlugin::new(&define)?);
        }
        if config.effective_minimize() && !has_minify {
            registry.add(MinifyPlugin::new(&MinifyOptions::default()));
        }

        registry.sort();
        tracing::debug!(plugins = ?registry.names(), "plugins registered");
        Ok(registry)
    }

    /// Add a plugin; call [`PluginRegistry::sort`] before running phases.
    pub fn add<P: Plugin + 'static>(&mut self, plugin: P) {
        self.plugins.push(Box::new(plugin));
    }

    /// Order plugins by phase, keeping declaration order within a phase.
    pub fn sort(&mut self) {
        self.plugins.sort_by_key(|plugin| plugin.phase());
    }

    /// Every plugin, in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins.iter().map(|plugin| plugin.as_ref())
    }

    /// Plugins of one phase, in declaration order.
    pub fn phase(&self, phase: PluginPhase) -> impl Iterator<Item = &dyn Plugin> {
        self.iter().filter(move |plugin| plugin.phase() == phase)
    }

    /// Whether any resolve-phase plugin drops `request`.
    pub fn ignores(&self, request: &str, importer_dir: &Path) -> bool {
        self.phase(PluginPhase::Resolve)
            .any(|plugin| plugin.ignores(request, importer_dir))
    }

    /// Whether stylesheets marked for extraction are pulled out of scripts.
    pub fn has_extract_css(&self) -> bool {
        self.iter().any(|plugin| plugin.name() == "extract-css")
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|plugin| plugin.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
