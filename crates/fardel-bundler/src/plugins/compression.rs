use std::io::Write;

use fardel_config::{CompressionAlgorithm, CompressionOptions};
use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression;
use regex::Regex;

use super::{Plugin, PluginPhase};
use crate::compilation::{Asset, AssetKind, Compilation};
use crate::template::{interpolate, PathData};
use crate::{Error, Result};

/// Adds pre-compressed copies of named assets.
pub struct CompressionPlugin {
    asset: String,
    algorithm: CompressionAlgorithm,
    test: Option<Regex>,
    threshold: u64,
    min_ratio: f64,
}

impl CompressionPlugin {
    pub fn new(options: &CompressionOptions) -> Result<Self> {
        let test = options
            .test
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| Error::plugin("compression", format!("invalid test pattern: {e}")))?;
        Ok(Self {
            asset: options.asset.clone(),
            algorithm: options.algorithm,
            test,
            threshold: options.threshold,
            min_ratio: options.min_ratio,
        })
    }

    fn accepts(&self, asset: &Asset) -> bool {
        asset.kind != AssetKind::Compressed
            && asset.size() as u64 >= self.threshold
            && self.test.as_ref().is_none_or(|test| test.is_match(&asset.filename))
    }
}

impl Plugin for CompressionPlugin {
    fn name(&self) -> &'static str {
        "compression"
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Compress
    }

    fn process_assets(&self, compilation: &mut Compilation) -> Result<()> {
        let mut variants = Vec::new();
        for asset in compilation.assets.iter().filter(|a| self.accepts(a)) {
            let compressed = compress(self.algorithm, &asset.source)
                .map_err(|e| Error::plugin(self.name(), format!("{}: {e}", asset.filename)))?;
            let ratio = if asset.source.is_empty() {
                1.0
            } else {
                compressed.len() as f64 / asset.source.len() as f64
            };
            if ratio > self.min_ratio {
                tracing::debug!(asset = %asset.filename, ratio, "compression skipped");
                continue;
            }

            let (path, query) = match asset.filename.split_once('?') {
                Some((path, query)) => (path, format!("?{query}")),
                None => (asset.filename.as_str(), String::new()),
            };
            let data = PathData::new()
                .with("path", path)
                .with("file", path)
                .with("query", query);
            let filename = interpolate(&self.asset, &data, compilation.hash_length)?;
            variants.push(Asset {
                filename,
                template: None,
                source: compressed,
                kind: AssetKind::Compressed,
                chunk: asset.chunk.clone(),
                origin: format!("compressed copy of '{}'", asset.filename),
            });
        }
        compilation.assets.extend(variants);
        Ok(())
    }
}

fn compress(algorithm: CompressionAlgorithm, bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    match algorithm {
        CompressionAlgorithm::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
            encoder.write_all(bytes)?;
            encoder.finish()
        }
        CompressionAlgorithm::Deflate => {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
            encoder.write_all(bytes)?;
            encoder.finish()
        }
    }
}

/// Gzipped size of `bytes`, for reports.
pub(crate) fn gzip_size(bytes: &[u8]) -> usize {
    compress(CompressionAlgorithm::Gzip, bytes).map_or(0, |c| c.len())
}
