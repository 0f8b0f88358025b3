//! `fardel init`: write a starter project.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::InitArgs;
use crate::commands::templates;
use crate::error::{CliError, Result};
use crate::ui;

const CONFIG_FILE: &str = "fardel.toml";

/// Execute the init command.
///
/// Refuses to replace an existing `fardel.toml` unless `--force` is given.
/// Existing starter sources are kept either way unless forced.
pub fn execute(args: InitArgs) -> Result<()> {
    let dir = match &args.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let written = init(&dir, args.force, args.bare)?;
    for path in &written {
        ui::success(&format!("Created {}", path.display()));
    }
    ui::info("Next: run `fardel build` (or `fardel watch --mode development`)");
    Ok(())
}

/// Write the starter files into `dir`, returning the paths written.
pub fn init(dir: &Path, force: bool, bare: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let config = dir.join(CONFIG_FILE);
    if config.exists() && !force {
        return Err(CliError::AlreadyExists(config));
    }
    fs::write(&config, templates::CONFIG)?;
    let mut written = vec![config];

    if !bare {
        for (rel, content) in templates::SOURCES {
            let path = dir.join(rel);
            if path.exists() && !force {
                ui::warning(&format!("Keeping existing {}", path.display()));
                continue;
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
            written.push(path);
        }
    }

    tracing::debug!(dir = %dir.display(), files = written.len(), "project initialized");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fardel_config::{validate_fs, ConfigDiscovery};
    use tempfile::TempDir;

    #[test]
    fn writes_config_and_sources() {
        let dir = TempDir::new().unwrap();
        let written = init(dir.path(), false, false).unwrap();
        assert_eq!(written.len(), 4);
        assert!(dir.path().join("src/index.html").is_file());
    }

    #[test]
    fn starter_config_is_valid() {
        let dir = TempDir::new().unwrap();
        init(dir.path(), false, false).unwrap();
        let config = ConfigDiscovery::new(dir.path()).load().unwrap();
        validate_fs(&config, dir.path()).unwrap();
        assert_eq!(config.plugins.len(), 3);
    }

    #[test]
    fn existing_config_needs_force() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "# mine").unwrap();
        match init(dir.path(), false, true) {
            Err(CliError::AlreadyExists(path)) => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("expected AlreadyExists, got {other:?}"),
        }
        init(dir.path(), true, true).unwrap();
        let config = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert!(config.contains("[entries]"));
    }

    #[test]
    fn existing_sources_are_kept() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/index.js"), "console.log(1);").unwrap();
        let written = init(dir.path(), false, false).unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(
            fs::read_to_string(dir.path().join("src/index.js")).unwrap(),
            "console.log(1);"
        );
    }

    #[test]
    fn bare_writes_only_the_config() {
        let dir = TempDir::new().unwrap();
        let written = init(dir.path(), false, true).unwrap();
        assert_eq!(written, [dir.path().join(CONFIG_FILE)]);
        assert!(!dir.path().join("src").exists());
    }
}
