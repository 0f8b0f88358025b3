//! The state one build threads through its plugin phases.

use std::collections::HashMap;

use crate::chunk::ChunkSet;
use crate::graph::ModuleGraph;
use crate::hash::{content_hash, BuildHasher};
use crate::template::{interpolate, PathData};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Script,
    Stylesheet,
    Page,
    Media,
    Compressed,
    Report,
}

/// A file headed for the output directory.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Final name relative to the output directory; empty until sealed when
    /// `template` is set
    pub filename: String,
    /// Filename template still to be interpolated
    pub template: Option<String>,
    pub source: Vec<u8>,
    pub kind: AssetKind,
    /// Chunk the asset belongs to
    pub chunk: Option<String>,
    /// Human-readable producer, used in collision errors
    pub origin: String,
}

impl Asset {
    /// An asset whose name is already final.
    pub fn named(
        filename: impl Into<String>,
        source: Vec<u8>,
        kind: AssetKind,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            template: None,
            source,
            kind,
            chunk: None,
            origin: origin.into(),
        }
    }

    /// An asset named from `template` once the build is sealed.
    pub fn templated(
        template: impl Into<String>,
        source: Vec<u8>,
        kind: AssetKind,
        chunk: &str,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            filename: String::new(),
            template: Some(template.into()),
            source,
            kind,
            chunk: Some(chunk.to_string()),
            origin: origin.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.source.len()
    }
}

pub struct Compilation {
    pub graph: ModuleGraph,
    pub chunks: ChunkSet,
    pub assets: Vec<Asset>,
    pub public_path: String,
    pub hash_length: usize,
    /// Build hash; set by [`Compilation::seal`]
    pub hash: Option<String>,
    pub warnings: Vec<String>,
}

impl Compilation {
    pub fn new(graph: ModuleGraph, chunks: ChunkSet, public_path: &str, hash_length: usize) -> Self {
        Self {
            graph,
            chunks,
            assets: Vec::new(),
            public_path: public_path.to_string(),
            hash_length,
            hash: None,
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    /// Assets of `kind` belonging to `chunk`.
    pub fn chunk_assets<'a>(
        &'a self,
        chunk: &'a str,
        kind: AssetKind,
    ) -> impl Iterator<Item = &'a Asset> + 'a {
        self.assets
            .iter()
            .filter(move |a| a.kind == kind && a.chunk.as_deref() == Some(chunk))
    }

    /// Public URL of a sealed asset.
    pub fn url(&self, asset: &Asset) -> String {
        format!("{}{}", self.public_path, asset.filename)
    }

    /// Compute the build hash and give every templated asset its final name.
    ///
    /// The build hash covers every asset's content in order, so identical
    /// inputs produce identical names across runs.
    pub fn seal(&mut self) -> Result<()> {
        let mut hasher = BuildHasher::new();
        for asset in &self.assets {
            hasher.update(asset.template.as_deref().unwrap_or(&asset.filename).as_bytes());
            hasher.update(&asset.source);
        }
        let build_hash = hasher.finish();

        let ids: HashMap<String, usize> = self
            .chunks
            .iter()
            .map(|chunk| (chunk.name.clone(), chunk.id))
            .collect();

        for asset in &mut self.assets {
            let Some(template) = asset.template.take() else {
                continue;
            };
            let digest = content_hash(&asset.source);
            let mut data = PathData::new()
                .with("hash", build_hash.clone())
                .with("chunkhash", digest.clone())
                .with("contenthash", digest);
            if let Some(chunk) = &asset.chunk {
                data.set("name", chunk.clone());
                if let Some(id) = ids.get(chunk) {
                    data.set("id", id.to_string());
                }
            }
            asset.filename = interpolate(&template, &data, self.hash_length)?;
            tracing::debug!(%template, filename = %asset.filename, "asset named");
        }

        self.hash = Some(build_hash);
        self.ensure_unique()
    }

    /// Fail when two assets share a filename.
    ///
    /// Identical media files emitted twice under one name (the same image
    /// reached from two rules, say) are merged instead. Chunk assets never
    /// merge: each chunk needs its own file.
    pub fn ensure_unique(&mut self) -> Result<()> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut duplicates = Vec::new();
        for (index, asset) in self.assets.iter().enumerate() {
            if let Some(&first) = seen.get(&asset.filename) {
                let earlier = &self.assets[first];
                if !mergeable(earlier, asset) {
                    return Err(Error::OutputCollision {
                        filename: asset.filename.clone(),
                        first: earlier.origin.clone(),
                        second: asset.origin.clone(),
                    });
                }
                duplicates.push(index);
            } else {
                seen.insert(asset.filename.clone(), index);
            }
        }
        for index in duplicates.into_iter().rev() {
            self.assets.remove(index);
        }
        Ok(())
    }
}

fn mergeable(a: &Asset, b: &Asset) -> bool {
    a.kind == AssetKind::Media
        && b.kind == AssetKind::Media
        && a.chunk.is_none()
        && b.chunk.is_none()
        && a.source == b.source
}
