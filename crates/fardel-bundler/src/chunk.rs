//! Chunks: the script bundles written to the output directory.

use std::collections::HashSet;

use crate::graph::ModuleGraph;
use crate::runtime::{GLOBAL, RUNTIME};
use crate::script::js_string;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Entry name the chunk was created for
    pub name: String,
    /// Position in entry declaration order
    pub id: usize,
    /// Modules executed when the chunk loads
    pub roots: Vec<String>,
    /// Modules defined by the chunk, dependencies first
    pub modules: Vec<String>,
    /// Whether the chunk starts with the module runtime
    pub has_runtime: bool,
    /// Whether a commons step hoisted shared modules into this chunk
    pub is_commons: bool,
    pub filename_template: String,
}

/// Every chunk of one build, in entry declaration order.
#[derive(Debug, Clone, Default)]
pub struct ChunkSet {
    chunks: Vec<Chunk>,
}

impl ChunkSet {
    /// One chunk per entry, each carrying the runtime.
    pub fn from_graph(graph: &ModuleGraph, filename_template: &str) -> Self {
        let chunks = graph
            .entries()
            .iter()
            .enumerate()
            .map(|(id, (name, entry))| Chunk {
                name: name.clone(),
                id,
                roots: entry.roots.clone(),
                modules: entry.modules.clone(),
                has_runtime: true,
                is_commons: false,
                filename_template: filename_template.to_string(),
            })
            .collect();
        Self { chunks }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.name == name)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Turn the chunk named `name` into the commons chunk.
    ///
    /// Modules required by at least `min_chunks` of the other chunks move
    /// into it, and every module it defines is removed from the others. The
    /// commons chunk becomes the only runtime chunk.
    pub fn hoist_commons(
        &mut self,
        name: &str,
        filename: Option<&str>,
        min_chunks: usize,
    ) -> Result<()> {
        let Some(commons_index) = self.chunks.iter().position(|chunk| chunk.name == name) else {
            return Err(Error::plugin(
                "commons",
                format!("no entry named '{name}' to hoist shared modules into"),
            ));
        };

        let mut shared = Vec::new();
        for (index, chunk) in self.chunks.iter().enumerate() {
            if index == commons_index {
                continue;
            }
            for id in &chunk.modules {
                if shared.contains(id) {
                    continue;
                }
                let users = self
                    .chunks
                    .iter()
                    .enumerate()
                    .filter(|(other, c)| *other != commons_index && c.modules.contains(id))
                    .count();
                if users >= min_chunks {
                    shared.push(id.clone());
                }
            }
        }

        let commons = &mut self.chunks[commons_index];
        for id in shared {
            if !commons.modules.contains(&id) {
                commons.modules.push(id);
            }
        }
        commons.is_commons = true;
        if let Some(filename) = filename {
            commons.filename_template = filename.to_string();
        }
        let hoisted: HashSet<String> = commons.modules.iter().cloned().collect();

        for (index, chunk) in self.chunks.iter_mut().enumerate() {
            chunk.has_runtime = index == commons_index;
            if index != commons_index {
                chunk.modules.retain(|id| !hoisted.contains(id));
            }
        }

        tracing::debug!(
            chunk = %name,
            modules = hoisted.len(),
            "hoisted shared modules into commons chunk"
        );
        Ok(())
    }

    /// Chunks in script load order: commons chunks first.
    pub fn load_order(&self) -> Vec<&Chunk> {
        let mut ordered: Vec<&Chunk> = self.chunks.iter().filter(|c| c.is_commons).collect();
        ordered.extend(self.chunks.iter().filter(|c| !c.is_commons));
        ordered
    }
}

impl FromIterator<Chunk> for ChunkSet {
    fn from_iter<I: IntoIterator<Item = Chunk>>(iter: I) -> Self {
        Self {
            chunks: iter.into_iter().collect(),
        }
    }
}

/// Serialize a chunk to JavaScript.
pub fn render(chunk: &Chunk, graph: &ModuleGraph) -> String {
    let mut out = String::new();
    if chunk.has_runtime {
        out.push_str(RUNTIME);
    }

    out.push_str(GLOBAL);
    out.push_str(".define({\n");
    let mut first = true;
    for module in chunk.modules.iter().filter_map(|id| graph.module(id)) {
        if !first {
            out.push_str(",\n");
        }
        first = false;
        out.push_str(&js_string(&module.id));
        out.push_str(": function (module, exports, require) {\n");
        out.push_str(&module.code);
        if !module.code.ends_with('\n') {
            out.push('\n');
        }
        out.push('}');
    }
    out.push_str("\n});\n");

    let roots: Vec<String> = chunk.roots.iter().map(|id| js_string(id)).collect();
    out.push_str(&format!("{GLOBAL}.run([{}]);\n", roots.join(", ")));
    out
}
