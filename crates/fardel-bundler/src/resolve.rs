//! Entry and dependency resolution.
//!
//! Path requests (`./a`, `../b`, `/abs`) resolve against the importer's
//! directory. Bare requests (`react`, `lodash/fp`) go through `resolve.alias`
//! prefixes first, then every `resolve.modules` directory walking up from the
//! importer. A candidate resolves as: the exact file, the file plus each
//! configured extension, or a directory (its `package.json` `browser`/`main`
//! field, else `index` plus an extension).

use std::fs;
use std::path::{Path, PathBuf};

use fardel_config::ResolveOptions;
use path_clean::PathClean;
use serde_json::Value;

use crate::{Error, Result};

pub struct Resolver {
    context: PathBuf,
    extensions: Vec<String>,
    modules: Vec<PathBuf>,
    alias: Vec<(String, PathBuf)>,
}

impl Resolver {
    pub fn new(context: &Path, options: &ResolveOptions) -> Self {
        let mut alias: Vec<(String, PathBuf)> = options
            .alias
            .iter()
            .map(|(key, target)| (key.clone(), context.join(target).clean()))
            .collect();
        // Longest prefix first so "@app/ui" beats "@app".
        alias.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            context: context.to_path_buf(),
            extensions: options.extensions.clone(),
            modules: options.modules.clone(),
            alias,
        }
    }

    pub fn context(&self) -> &Path {
        &self.context
    }

    /// Resolve a declared entry path against the context.
    ///
    /// Entry paths are file paths even without a leading `./`.
    pub fn resolve_entry(&self, name: &str, path: &str) -> Result<PathBuf> {
        let candidate = self.context.join(path).clean();
        self.resolve_path(&candidate)
            .ok_or_else(|| Error::ResolutionFailed {
                request: path.to_string(),
                importer: format!("entry '{name}'"),
            })
    }

    /// Resolve `request` as imported from a file in `from_dir`.
    pub fn resolve(&self, request: &str, from_dir: &Path) -> Result<PathBuf> {
        let resolved = if is_path_request(request) {
            self.resolve_path(&from_dir.join(request).clean())
        } else if let Some(target) = self.alias_target(request) {
            self.resolve_path(&target)
        } else {
            self.resolve_bare(request, from_dir)
        };

        match resolved {
            Some(path) => {
                tracing::trace!(request, path = %path.display(), "resolved");
                Ok(path)
            }
            None => Err(Error::ResolutionFailed {
                request: request.to_string(),
                importer: from_dir.display().to_string(),
            }),
        }
    }

    fn alias_target(&self, request: &str) -> Option<PathBuf> {
        self.alias.iter().find_map(|(key, target)| {
            if request == key {
                Some(target.clone())
            } else {
                request
                    .strip_prefix(key.as_str())
                    .and_then(|rest| rest.strip_prefix('/'))
                    .map(|rest| target.join(rest).clean())
            }
        })
    }

    fn resolve_bare(&self, request: &str, from_dir: &Path) -> Option<PathBuf> {
        for module_dir in &self.modules {
            if module_dir.is_absolute() {
                if let Some(found) = self.resolve_path(&module_dir.join(request).clean()) {
                    return Some(found);
                }
                continue;
            }

            for dir in from_dir.ancestors() {
                let base = dir.join(module_dir);
                if !base.is_dir() {
                    continue;
                }
                if let Some(found) = self.resolve_path(&base.join(request).clean()) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Resolve an absolute candidate path.
    pub fn resolve_path(&self, candidate: &Path) -> Option<PathBuf> {
        if let Some(file) = self.resolve_file(candidate) {
            return Some(file);
        }
        if candidate.is_dir() {
            return self.resolve_dir(candidate);
        }
        None
    }

    fn resolve_file(&self, candidate: &Path) -> Option<PathBuf> {
        if candidate.is_file() {
            return Some(candidate.to_path_buf());
        }
        let file_name = candidate.file_name()?.to_str()?;
        self.extensions
            .iter()
            .map(|ext| candidate.with_file_name(format!("{file_name}{ext}")))
            .find(|path| path.is_file())
    }

    fn resolve_dir(&self, dir: &Path) -> Option<PathBuf> {
        if let Some(main) = package_main(dir) {
            let target = dir.join(main).clean();
            if let Some(found) = self.resolve_file(&target) {
                return Some(found);
            }
            if target.is_dir() && target != dir {
                if let Some(found) = self.resolve_file(&target.join("index")) {
                    return Some(found);
                }
            }
        }
        self.resolve_file(&dir.join("index"))
    }
}

/// True for `./x`, `../x`, `.`, `..` and absolute paths.
pub fn is_path_request(request: &str) -> bool {
    request == "."
        || request == ".."
        || request.starts_with("./")
        || request.starts_with("../")
        || Path::new(request).is_absolute()
}

fn package_main(dir: &Path) -> Option<String> {
    let content = fs::read_to_string(dir.join("package.json")).ok()?;
    let manifest: Value = serde_json::from_str(&content).ok()?;
    ["browser", "main"]
        .iter()
        .find_map(|field| manifest.get(*field).and_then(Value::as_str))
        .filter(|main| !main.is_empty())
        .map(str::to_string)
}

/// The stable id of a module: its context-relative path with a `./` prefix.
pub fn module_id(context: &Path, path: &Path) -> String {
    match path.strip_prefix(context) {
        Ok(relative) => {
            let parts: Vec<_> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect();
            format!("./{}", parts.join("/"))
        }
        Err(_) => path.to_string_lossy().replace('\\', "/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn resolver(root: &Path) -> Resolver {
        Resolver::new(root, &ResolveOptions::default())
    }

    #[test]
    fn relative_request_tries_extensions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/util.js", "");
        let found = resolver(dir.path())
            .resolve("./util", &dir.path().join("src"))
            .unwrap();
        assert_eq!(found, dir.path().join("src/util.js"));
    }

    #[test]
    fn directory_request_uses_index() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/widgets/index.jsx", "");
        let found = resolver(dir.path())
            .resolve("./widgets", &dir.path().join("src"))
            .unwrap();
        assert_eq!(found, dir.path().join("src/widgets/index.jsx"));
    }

    #[test]
    fn bare_request_reads_package_main() {
        let dir = TempDir::new().unwrap();
        touch(
            dir.path(),
            "node_modules/react/package.json",
            r#"{ "main": "cjs/react.js" }"#,
        );
        touch(dir.path(), "node_modules/react/cjs/react.js", "");
        let found = resolver(dir.path())
            .resolve("react", &dir.path().join("src/pages"))
            .unwrap();
        assert_eq!(found, dir.path().join("node_modules/react/cjs/react.js"));
    }

    #[test]
    fn bare_subpath_resolves_inside_package() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "node_modules/lodash/fp.js", "");
        let found = resolver(dir.path())
            .resolve("lodash/fp", dir.path())
            .unwrap();
        assert_eq!(found, dir.path().join("node_modules/lodash/fp.js"));
    }

    #[test]
    fn alias_prefix_is_rewritten() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/components/button.js", "");
        let mut options = ResolveOptions::default();
        options
            .alias
            .insert("@components".to_string(), PathBuf::from("src/components"));
        let found = Resolver::new(dir.path(), &options)
            .resolve("@components/button", &dir.path().join("src/pages"))
            .unwrap();
        assert_eq!(found, dir.path().join("src/components/button.js"));
    }

    #[test]
    fn missing_request_reports_importer() {
        let dir = TempDir::new().unwrap();
        let err = resolver(dir.path())
            .resolve("./nope", dir.path())
            .unwrap_err();
        assert!(matches!(err, Error::ResolutionFailed { ref request, .. } if request == "./nope"));
    }

    #[test]
    fn entry_paths_need_no_dot_prefix() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/index.js", "");
        let found = resolver(dir.path()).resolve_entry("index", "src/index").unwrap();
        assert_eq!(found, dir.path().join("src/index.js"));
    }

    #[test]
    fn module_ids_are_context_relative() {
        let root = Path::new("/repo");
        assert_eq!(module_id(root, Path::new("/repo/src/a.js")), "./src/a.js");
        assert_eq!(module_id(root, Path::new("/elsewhere/b.js")), "/elsewhere/b.js");
    }
}
