use std::fs;
use std::path::{Path, PathBuf};

use fardel_config::CleanOptions;
use path_clean::PathClean;

use super::{Plugin, PluginPhase};
use crate::{Error, Result};

/// Removes stale output before the build writes anything.
pub struct CleanPlugin {
    paths: Vec<PathBuf>,
}

impl CleanPlugin {
    pub fn new(options: &CleanOptions, context: &Path) -> Self {
        let paths = options
            .paths
            .iter()
            .map(|path| context.join(path).clean())
            .collect();
        Self { paths }
    }
}

impl Plugin for CleanPlugin {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Prepare
    }

    fn prepare(&self, context: &Path) -> Result<()> {
        let context = context.clean();
        for path in &self.paths {
            if !path.starts_with(&context) || *path == context {
                return Err(Error::plugin(
                    self.name(),
                    format!(
                        "refusing to remove '{}': it is not inside {}",
                        path.display(),
                        context.display()
                    ),
                ));
            }

            let removed = if path.is_dir() {
                fs::remove_dir_all(path).map(|_| true)
            } else if path.exists() {
                fs::remove_file(path).map(|_| true)
            } else {
                Ok(false)
            };
            match removed {
                Ok(true) => tracing::info!(path = %path.display(), "removed"),
                Ok(false) => tracing::debug!(path = %path.display(), "nothing to remove"),
                Err(e) => {
                    return Err(Error::plugin(
                        self.name(),
                        format!("failed to remove '{}': {e}", path.display()),
                    ));
                }
            }
        }
        Ok(())
    }
}
