//! Shared helpers for locating and loading a project.

use std::path::{Path, PathBuf};

use fardel_config::{load_config, ConfigDiscovery, ConfigOverrides, FardelConfig, GlobalSettings};

use crate::cli::ProjectArgs;
use crate::error::{CliError, Result};

/// A loaded project: its directory, resolved config and build context.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub context: PathBuf,
    pub config: FardelConfig,
}

/// The absolute project directory: `--cwd` if given, else the current one.
pub fn project_root(cwd: Option<&Path>) -> Result<PathBuf> {
    let root = match cwd {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        return Err(CliError::FileNotFound(root));
    }
    Ok(root.canonicalize()?)
}

/// Locate the project and load its config with `overrides` applied.
pub fn load_project(args: &ProjectArgs, overrides: ConfigOverrides) -> Result<Project> {
    let root = project_root(args.cwd.as_deref())?;
    let config = load_config(&root, args.config.as_deref(), overrides)?;
    let context = config.context_or(&root);
    tracing::debug!(root = %root.display(), context = %context.display(), "project loaded");
    Ok(Project {
        root,
        context,
        config,
    })
}

/// Logging settings from the project's config file.
///
/// Read before the logger exists, so any failure yields defaults; the
/// command reports the real error when it loads the config itself.
pub fn peek_settings(args: Option<&ProjectArgs>) -> GlobalSettings {
    let Some(args) = args else {
        return GlobalSettings::default();
    };
    let Ok(root) = project_root(args.cwd.as_deref()) else {
        return GlobalSettings::default();
    };
    let discovery = ConfigDiscovery::new(&root);
    let path = match &args.config {
        Some(path) => Some(root.join(path)),
        None => discovery.find(),
    };
    path.and_then(|path| discovery.load_from(&path).ok())
        .map(|config| config.settings)
        .unwrap_or_default()
}
