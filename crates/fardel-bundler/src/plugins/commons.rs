use fardel_config::CommonsOptions;

use super::{Plugin, PluginPhase};
use crate::chunk::ChunkSet;
use crate::graph::ModuleGraph;
use crate::Result;

/// Hoists shared modules into the chunk of a named entry.
///
/// Without `min_chunks`, a module moves when every other entry chunk uses
/// it (and at least two do).
pub struct CommonsPlugin {
    name: String,
    filename: Option<String>,
    min_chunks: Option<usize>,
}

impl CommonsPlugin {
    pub fn new(options: &CommonsOptions) -> Self {
        Self {
            name: options.name.clone(),
            filename: options.filename.clone(),
            min_chunks: options.min_chunks,
        }
    }
}

impl Plugin for CommonsPlugin {
    fn name(&self) -> &'static str {
        "commons"
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Chunk
    }

    fn optimize_chunks(&self, chunks: &mut ChunkSet, _graph: &ModuleGraph) -> Result<()> {
        let others = chunks.len().saturating_sub(1);
        let min_chunks = self.min_chunks.unwrap_or(others.max(2));
        chunks.hoist_commons(&self.name, self.filename.as_deref(), min_chunks)
    }
}
