use fardel_config::ExtractCssOptions;

use super::{Plugin, PluginPhase};
use crate::compilation::{Asset, AssetKind, Compilation};
use crate::Result;

/// Collects extracted stylesheets into one CSS file per chunk.
pub struct ExtractCssPlugin {
    filename: String,
}

impl ExtractCssPlugin {
    pub fn new(options: &ExtractCssOptions) -> Self {
        Self {
            filename: options.filename.clone(),
        }
    }
}

impl Plugin for ExtractCssPlugin {
    fn name(&self) -> &'static str {
        "extract-css"
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Assets
    }

    fn process_assets(&self, compilation: &mut Compilation) -> Result<()> {
        let mut assets = Vec::new();
        for chunk in compilation.chunks.iter() {
            let sheets: Vec<&str> = chunk
                .modules
                .iter()
                .filter_map(|id| compilation.graph.module(id))
                .filter_map(|module| module.css.as_deref())
                .collect();
            if sheets.is_empty() {
                continue;
            }

            let mut css = sheets.join("\n");
            if !css.ends_with('\n') {
                css.push('\n');
            }
            tracing::debug!(chunk = %chunk.name, sheets = sheets.len(), "stylesheets extracted");
            assets.push(Asset::templated(
                self.filename.clone(),
                css.into_bytes(),
                AssetKind::Stylesheet,
                &chunk.name,
                format!("stylesheet of chunk '{}'", chunk.name),
            ));
        }
        compilation.assets.extend(assets);
        Ok(())
    }
}
