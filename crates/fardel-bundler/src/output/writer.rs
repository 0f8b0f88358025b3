//! Atomic, path-validated writes into the output directory.
//!
//! Every asset is first written to a sibling temporary file; only when all of
//! them are staged are they renamed into place. A failure at any point
//! removes the staged files and any already renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::compilation::Asset;
use crate::{Error, Result};

/// Write `assets` under `dir`, creating directories as needed.
///
/// Returns the absolute paths written, in asset order.
pub fn write_assets(assets: &[Asset], dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = validate_and_normalize_dir(dir)?;
    fs::create_dir_all(&dir).map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to create output directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut operations = Vec::with_capacity(assets.len());
    for asset in assets {
        let target_path = validate_output_path(&dir, &asset.filename)?;
        operations.push((target_path, asset.source.as_slice()));
    }

    write_files_atomic(&operations)?;
    tracing::debug!(files = operations.len(), dir = %dir.display(), "assets written");
    Ok(operations.into_iter().map(|(path, _)| path).collect())
}

fn validate_and_normalize_dir(dir: &Path) -> Result<PathBuf> {
    let cleaned = dir.clean();
    if cleaned.is_absolute() {
        return Ok(cleaned);
    }
    let cwd = std::env::current_dir()
        .map_err(|e| Error::InvalidOutputPath(format!("Failed to get current directory: {}", e)))?;
    Ok(cwd.join(&cleaned).clean())
}

/// Resolve `filename` under `base_dir`, rejecting anything that escapes it.
pub fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.is_empty() {
        return Err(Error::InvalidOutputPath("Filename is empty".to_string()));
    }
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    #[cfg(target_os = "windows")]
    {
        let stem = Path::new(filename)
            .file_stem()
            .map(|s| s.to_string_lossy().to_uppercase())
            .unwrap_or_default();
        let device_names = [
            "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
            "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
        ];
        if device_names.contains(&stem.as_str()) {
            return Err(Error::InvalidOutputPath(format!(
                "Filename is a reserved device name: {}",
                filename
            )));
        }
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();
    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            filename,
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut staged = Vec::new();

    for (target_path, content) in operations {
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                cleanup_temp_files(&staged);
                Error::WriteFailure(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp = temp_path(target_path);
        fs::write(&temp, content).map_err(|e| {
            cleanup_temp_files(&staged);
            Error::WriteFailure(format!(
                "Failed to write temporary file '{}': {}",
                temp.display(),
                e
            ))
        })?;

        staged.push((temp, target_path.clone()));
    }

    for (index, (temp, target_path)) in staged.iter().enumerate() {
        fs::rename(temp, target_path).map_err(|e| {
            remove_renamed(&staged[..index]);
            cleanup_temp_files(&staged);
            Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {}",
                temp.display(),
                target_path.display(),
                e
            ))
        })?;
    }

    Ok(())
}

/// Best effort; we are already failing.
fn cleanup_temp_files(staged: &[(PathBuf, PathBuf)]) {
    for (temp, _) in staged {
        if temp.exists() {
            if let Err(e) = fs::remove_file(temp) {
                tracing::warn!(path = %temp.display(), error = %e, "failed to remove temporary file");
            }
        }
    }
}

/// Remove targets that were already renamed into place.
fn remove_renamed(renamed: &[(PathBuf, PathBuf)]) {
    for (_, target) in renamed {
        if let Err(e) = fs::remove_file(target) {
            tracing::warn!(path = %target.display(), error = %e, "failed to roll back written file");
        }
    }
}
