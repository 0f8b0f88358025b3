//! The build pass.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fardel_config::{validate_schema, FardelConfig};

use crate::chunk::{render, ChunkSet};
use crate::compilation::{Asset, AssetKind, Compilation};
use crate::graph::{GraphContext, ModuleGraph};
use crate::output::write_assets;
use crate::plugins::{PluginPhase, PluginRegistry};
use crate::resolve::Resolver;
use crate::rules::RuleSet;
use crate::{Error, Result};

/// A file written by the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
    /// Path relative to the output directory
    pub filename: String,
    pub size: usize,
    pub kind: AssetKind,
    pub chunk: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSummary {
    pub name: String,
    pub files: Vec<String>,
    pub modules: usize,
    pub is_commons: bool,
}

#[derive(Debug, Clone)]
pub struct BuildResult {
    pub assets: Vec<EmittedAsset>,
    pub chunks: Vec<ChunkSummary>,
    /// Build hash over every asset's content
    pub hash: String,
    pub output_dir: PathBuf,
    pub duration: Duration,
    pub warnings: Vec<String>,
}

impl BuildResult {
    pub fn total_size(&self) -> usize {
        self.assets.iter().map(|a| a.size).sum()
    }

    pub fn asset(&self, filename: &str) -> Option<&EmittedAsset> {
        self.assets.iter().find(|a| a.filename == filename)
    }
}

/// Runs one build for a validated configuration.
pub struct Bundler {
    config: FardelConfig,
    context: PathBuf,
    rules: RuleSet,
    plugins: PluginRegistry,
}

impl Bundler {
    /// Validate `config` and prepare a build rooted at its context, or at the
    /// current directory when it has none.
    pub fn new(config: FardelConfig) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let context = config.context_or(&cwd);
        Self::with_context(config, &context)
    }

    pub fn with_context(config: FardelConfig, context: &Path) -> Result<Self> {
        validate_schema(&config)?;
        let context = context.to_path_buf();
        let rules = RuleSet::compile(&config.rules, &context)?;
        let plugins = PluginRegistry::from_config(&config, &context)?;
        Ok(Self {
            config,
            context,
            rules,
            plugins,
        })
    }

    pub fn context(&self) -> &Path {
        &self.context
    }

    pub fn config(&self) -> &FardelConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub fn output_dir(&self) -> PathBuf {
        self.context.join(&self.config.output.path)
    }

    /// Run the build and write its output.
    ///
    /// Any failing step aborts the build; files staged by the writer are
    /// removed again.
    pub fn build(&self) -> Result<BuildResult> {
        let started = Instant::now();
        let output = &self.config.output;
        let out_dir = self.output_dir();
        tracing::info!(context = %self.context.display(), mode = %self.config.mode, "build started");

        for plugin in self.plugins.phase(PluginPhase::Prepare) {
            plugin.prepare(&self.context)?;
        }

        let resolver = Resolver::new(&self.context, &self.config.resolve);
        let cx = GraphContext {
            resolver: &resolver,
            rules: &self.rules,
            plugins: &self.plugins,
            public_path: &output.public_path,
            hash_length: output.hash_length,
        };
        let graph = ModuleGraph::build(&self.config.entries, &cx)?;
        tracing::info!(modules = graph.len(), "module graph built");

        let mut chunks = ChunkSet::from_graph(&graph, &output.filename);
        for plugin in self.plugins.phase(PluginPhase::Chunk) {
            plugin.optimize_chunks(&mut chunks, &graph)?;
        }

        let mut compilation = Compilation::new(graph, chunks, &output.public_path, output.hash_length);
        for file in compilation.graph.emitted() {
            compilation.assets.push(Asset::named(
                file.filename.clone(),
                file.source.clone(),
                AssetKind::Media,
                format!("file '{}'", file.filename),
            ));
        }
        let scripts: Vec<Asset> = compilation
            .chunks
            .iter()
            .map(|chunk| {
                Asset::templated(
                    chunk.filename_template.clone(),
                    render(chunk, &compilation.graph).into_bytes(),
                    AssetKind::Script,
                    &chunk.name,
                    format!("chunk '{}'", chunk.name),
                )
            })
            .collect();
        compilation.assets.extend(scripts);

        self.run_phase(PluginPhase::Assets, &mut compilation)?;
        self.run_phase(PluginPhase::Optimize, &mut compilation)?;
        compilation.seal()?;
        self.run_phase(PluginPhase::Pages, &mut compilation)?;
        self.run_phase(PluginPhase::Compress, &mut compilation)?;
        compilation.ensure_unique()?;

        write_assets(&compilation.assets, &out_dir)?;
        tracing::info!(files = compilation.assets.len(), dir = %out_dir.display(), "output written");

        let written = compilation.assets.len();
        self.run_phase(PluginPhase::Report, &mut compilation)?;
        if compilation.assets.len() > written {
            compilation.ensure_unique()?;
            write_assets(&compilation.assets[written..], &out_dir)?;
        }

        let result = self.summarize(compilation, out_dir, started.elapsed())?;
        tracing::info!(
            assets = result.assets.len(),
            hash = %result.hash,
            elapsed_ms = result.duration.as_millis() as u64,
            "build finished"
        );
        Ok(result)
    }

    fn run_phase(&self, phase: PluginPhase, compilation: &mut Compilation) -> Result<()> {
        for plugin in self.plugins.phase(phase) {
            tracing::debug!(plugin = plugin.name(), phase = phase.as_str(), "running plugin");
            plugin.process_assets(compilation)?;
        }
        Ok(())
    }

    fn summarize(&self, compilation: Compilation, output_dir: PathBuf, duration: Duration) -> Result<BuildResult> {
        let hash = compilation
            .hash
            .clone()
            .ok_or_else(|| Error::InvalidConfig("build finished without being sealed".into()))?;

        let chunks = compilation
            .chunks
            .iter()
            .map(|chunk| ChunkSummary {
                name: chunk.name.clone(),
                files: compilation
                    .assets
                    .iter()
                    .filter(|a| {
                        a.chunk.as_deref() == Some(chunk.name.as_str())
                            && matches!(a.kind, AssetKind::Script | AssetKind::Stylesheet)
                    })
                    .map(|a| a.filename.clone())
                    .collect(),
                modules: chunk.modules.len(),
                is_commons: chunk.is_commons,
            })
            .collect();

        let assets = compilation
            .assets
            .iter()
            .map(|asset| EmittedAsset {
                filename: asset.filename.clone(),
                size: asset.size(),
                kind: asset.kind,
                chunk: asset.chunk.clone(),
            })
            .collect();

        Ok(BuildResult {
            assets,
            chunks,
            hash,
            output_dir,
            duration,
            warnings: compilation.warnings,
        })
    }
}
