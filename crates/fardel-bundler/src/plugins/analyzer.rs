use fardel_config::AnalyzerOptions;
use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;

use super::compression::gzip_size;
use super::{Plugin, PluginPhase};
use crate::compilation::{Asset, AssetKind, Compilation};
use crate::graph::ModuleKind;
use crate::{Error, Result};

const REPORT: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Bundle report</title>
<style>
body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; margin-bottom: 2em; }
th, td { padding: 0.25em 1em; text-align: left; }
td.size { text-align: right; font-variant-numeric: tabular-nums; }
</style>
</head>
<body>
<h1>Bundle report</h1>
<p>Build {{ hash }}: {{ chunks | length }} chunks, {{ module_count }} modules.</p>
{% for chunk in chunks %}
<h2>{{ chunk.name }}{% if chunk.commons %} (commons){% endif %}</h2>
<table>
<tr><th>File</th><th>Size</th><th>Gzip</th></tr>
{% for file in chunk.files %}<tr><td>{{ file.filename }}</td><td class="size">{{ file.size }}</td><td class="size">{{ file.gzip }}</td></tr>
{% endfor %}</table>
<table>
<tr><th>Module</th><th>Kind</th><th>Size</th></tr>
{% for module in chunk.modules %}<tr><td>{{ module.id }}</td><td>{{ module.kind }}</td><td class="size">{{ module.size }}</td></tr>
{% endfor %}</table>
{% endfor %}
</body>
</html>
"#;

#[derive(Debug, Serialize)]
struct Stats {
    hash: String,
    chunks: Vec<ChunkStats>,
    assets: Vec<FileStats>,
}

#[derive(Debug, Serialize)]
struct ChunkStats {
    name: String,
    id: usize,
    commons: bool,
    files: Vec<FileStats>,
    modules: Vec<ModuleStats>,
}

#[derive(Debug, Serialize)]
struct FileStats {
    filename: String,
    kind: AssetKind,
    size: usize,
    gzip: usize,
}

#[derive(Debug, Serialize)]
struct ModuleStats {
    id: String,
    kind: ModuleKind,
    size: usize,
}

/// Writes a size report of chunks and modules once the build is on disk.
pub struct AnalyzerPlugin {
    report_filename: String,
    stats_filename: Option<String>,
}

impl AnalyzerPlugin {
    pub fn new(options: &AnalyzerOptions) -> Self {
        Self {
            report_filename: options.report_filename.clone(),
            stats_filename: options.stats_filename.clone(),
        }
    }

    fn stats(compilation: &Compilation) -> Stats {
        let file = |asset: &Asset| FileStats {
            filename: asset.filename.clone(),
            kind: asset.kind,
            size: asset.size(),
            gzip: gzip_size(&asset.source),
        };

        let chunks = compilation
            .chunks
            .iter()
            .map(|chunk| ChunkStats {
                name: chunk.name.clone(),
                id: chunk.id,
                commons: chunk.is_commons,
                files: compilation
                    .assets
                    .iter()
                    .filter(|a| {
                        a.chunk.as_deref() == Some(chunk.name.as_str())
                            && matches!(a.kind, AssetKind::Script | AssetKind::Stylesheet)
                    })
                    .map(file)
                    .collect(),
                modules: chunk
                    .modules
                    .iter()
                    .filter_map(|id| compilation.graph.module(id))
                    .map(|module| ModuleStats {
                        id: module.id.clone(),
                        kind: module.kind,
                        size: module.size(),
                    })
                    .collect(),
            })
            .collect();

        Stats {
            hash: compilation.hash.clone().unwrap_or_default(),
            chunks,
            assets: compilation
                .assets
                .iter()
                .filter(|a| a.kind != AssetKind::Report)
                .map(file)
                .collect(),
        }
    }
}

impl Plugin for AnalyzerPlugin {
    fn name(&self) -> &'static str {
        "analyzer"
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Report
    }

    fn process_assets(&self, compilation: &mut Compilation) -> Result<()> {
        let stats = Self::stats(compilation);

        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        let report = env
            .render_str(
                REPORT,
                context! {
                    hash => &stats.hash,
                    chunks => &stats.chunks,
                    module_count => compilation.graph.len(),
                },
            )
            .map_err(|e| Error::plugin(self.name(), e.to_string()))?;
        compilation.assets.push(Asset::named(
            self.report_filename.clone(),
            report.into_bytes(),
            AssetKind::Report,
            "analyzer report",
        ));

        if let Some(stats_filename) = &self.stats_filename {
            let json = serde_json::to_vec_pretty(&stats)
                .map_err(|e| Error::plugin(self.name(), e.to_string()))?;
            compilation.assets.push(Asset::named(
                stats_filename.clone(),
                json,
                AssetKind::Report,
                "analyzer stats",
            ));
        }
        tracing::info!(report = %self.report_filename, "bundle report generated");
        Ok(())
    }
}
