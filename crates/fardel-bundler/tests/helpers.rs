#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use fardel_bundler::{BuildResult, Bundler, Result};
use fardel_config::{FardelConfig, Mode};
use tempfile::TempDir;

/// A throwaway project directory.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, rel: &str, content: impl AsRef<[u8]>) -> &Self {
        let path = self.path().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        fs::write(path, content).expect("write file");
        self
    }

    pub fn out(&self, rel: &str) -> PathBuf {
        self.path().join("build").join(rel)
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.out(rel)).unwrap_or_else(|e| panic!("read {rel}: {e}"))
    }

    pub fn build(&self, config: FardelConfig) -> Result<BuildResult> {
        Bundler::with_context(config, self.path())?.build()
    }

    /// Output files, relative to the output directory, sorted.
    pub fn outputs(&self) -> Vec<String> {
        let root = self.path().join("build");
        let mut files: Vec<String> = walkdir::WalkDir::new(&root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(&root)
                    .expect("inside output")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }
}

/// Development mode without minification, so output stays readable.
pub fn readable() -> FardelConfig {
    FardelConfig {
        mode: Mode::Development,
        minimize: Some(false),
        ..FardelConfig::default()
    }
}
