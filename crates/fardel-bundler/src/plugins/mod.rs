//! Built-in plugin steps.
//!
//! Every plugin belongs to one [`PluginPhase`]; phases run in a fixed order
//! and plugins of the same phase run in declaration order.

mod analyzer;
mod clean;
mod commons;
mod compression;
mod define;
mod extract_css;
mod html;
mod ignore;
mod minify;
pub mod registry;

use std::path::Path;

use crate::chunk::ChunkSet;
use crate::compilation::Compilation;
use crate::graph::ModuleGraph;
use crate::Result;

pub use analyzer::AnalyzerPlugin;
pub use clean::CleanPlugin;
pub use commons::CommonsPlugin;
pub use compression::CompressionPlugin;
pub use define::DefinePlugin;
pub use extract_css::ExtractCssPlugin;
pub use html::HtmlPlugin;
pub use ignore::IgnorePlugin;
pub use minify::MinifyPlugin;
pub use registry::PluginRegistry;

/// Plugin execution phases
///
/// Plugins are executed in phase order (lower numbers first). Asset names
/// are fixed between `Optimize` and `Pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PluginPhase {
    /// Before anything is read or written
    Prepare = 0,

    /// Decides which requests reach the resolver
    Resolve = 10,

    /// Rewrites script module source
    Transform = 20,

    /// Rearranges modules between chunks
    Chunk = 30,

    /// Adds assets derived from the module graph
    Assets = 40,

    /// Rewrites asset contents before they are hashed
    Optimize = 50,

    /// Adds pages that reference named assets
    Pages = 60,

    /// Adds variants of named assets
    Compress = 70,

    /// Runs after the output directory is written
    Report = 100,
}

impl PluginPhase {
    pub const ALL: [PluginPhase; 9] = [
        PluginPhase::Prepare,
        PluginPhase::Resolve,
        PluginPhase::Transform,
        PluginPhase::Chunk,
        PluginPhase::Assets,
        PluginPhase::Optimize,
        PluginPhase::Pages,
        PluginPhase::Compress,
        PluginPhase::Report,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginPhase::Prepare => "prepare",
            PluginPhase::Resolve => "resolve",
            PluginPhase::Transform => "transform",
            PluginPhase::Chunk => "chunk",
            PluginPhase::Assets => "assets",
            PluginPhase::Optimize => "optimize",
            PluginPhase::Pages => "pages",
            PluginPhase::Compress => "compress",
            PluginPhase::Report => "report",
        }
    }
}

/// A build step. Each hook has a no-op default; a plugin overrides the
/// hook its phase calls.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn phase(&self) -> PluginPhase;

    /// `Prepare`: runs once before the graph is built.
    fn prepare(&self, _context: &Path) -> Result<()> {
        Ok(())
    }

    /// `Resolve`: whether `request`, made from a file in `importer_dir`, is
    /// dropped.
    fn ignores(&self, _request: &str, _importer_dir: &Path) -> bool {
        false
    }

    /// `Transform`: rewrite a script module body.
    fn transform_script(&self, code: String) -> String {
        code
    }

    /// `Chunk`: rearrange chunks after the graph is built.
    fn optimize_chunks(&self, _chunks: &mut ChunkSet, _graph: &ModuleGraph) -> Result<()> {
        Ok(())
    }

    /// `Assets`, `Optimize`, `Pages`, `Compress` and `Report`.
    fn process_assets(&self, _compilation: &mut Compilation) -> Result<()> {
        Ok(())
    }
}
