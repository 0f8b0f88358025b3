use fardel_config::MinifyOptions;

use super::{Plugin, PluginPhase};
use crate::compilation::{AssetKind, Compilation};
use crate::minify::{minify_css, minify_js};
use crate::Result;

/// Minifies script bundles with oxc and stylesheets with lightningcss.
///
/// Output that fails to parse is kept as is, with a warning.
pub struct MinifyPlugin {
    js: bool,
    css: bool,
}

impl MinifyPlugin {
    pub fn new(options: &MinifyOptions) -> Self {
        Self {
            js: options.js,
            css: options.css,
        }
    }
}

impl Plugin for MinifyPlugin {
    fn name(&self) -> &'static str {
        "minify"
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Optimize
    }

    fn process_assets(&self, compilation: &mut Compilation) -> Result<()> {
        let mut warnings = Vec::new();
        for asset in &mut compilation.assets {
            let minifier: fn(&str) -> Option<String> = match asset.kind {
                AssetKind::Script if self.js => minify_js,
                AssetKind::Stylesheet if self.css => minify_css,
                _ => continue,
            };
            let Ok(source) = std::str::from_utf8(&asset.source) else {
                continue;
            };
            let before = asset.source.len();
            match minifier(source) {
                Some(minified) => {
                    tracing::debug!(origin = %asset.origin, before, after = minified.len(), "minified");
                    asset.source = minified.into_bytes();
                }
                None => warnings.push(format!("{} could not be parsed; left unminified", asset.origin)),
            }
        }
        for warning in warnings {
            compilation.warn(warning);
        }
        Ok(())
    }
}
