//! Built-in loaders.
//!
//! A loader turns one representation of a file into another. Chains run
//! right to left: the rightmost loader receives the raw file bytes and the
//! leftmost loader's output becomes the module.

mod css;
mod file;
mod html;
mod raw;
mod style;

use std::path::Path;

use fardel_config::LoaderRef;

use crate::{Error, Result};

pub use css::CssLoader;
pub use file::FileLoader;
pub use html::HtmlLoader;
pub use raw::RawLoader;
pub use style::StyleLoader;

/// Intermediate representation passed between loaders.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// File bytes as read from disk
    Raw(Vec<u8>),
    /// Stylesheet text; `@import`s and `url()`s are recorded on the context
    Stylesheet(String),
    /// CommonJS module body
    Script(String),
}

impl Content {
    fn kind(&self) -> &'static str {
        match self {
            Content::Raw(_) => "raw bytes",
            Content::Stylesheet(_) => "a stylesheet",
            Content::Script(_) => "a script",
        }
    }
}

/// A file emitted as a side effect of loading (e.g. by `file-loader`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub filename: String,
    pub source: Vec<u8>,
}

/// Per-file state shared by the loaders of one chain.
pub struct LoaderContext<'a> {
    pub resource: &'a Path,
    pub context: &'a Path,
    pub public_path: &'a str,
    pub hash_length: usize,
    imports: Vec<String>,
    urls: Vec<String>,
    emitted: Vec<EmittedFile>,
    public_url: Option<String>,
}

impl<'a> LoaderContext<'a> {
    pub fn new(resource: &'a Path, context: &'a Path, public_path: &'a str, hash_length: usize) -> Self {
        Self {
            resource,
            context,
            public_path,
            hash_length,
            imports: Vec::new(),
            urls: Vec::new(),
            emitted: Vec::new(),
            public_url: None,
        }
    }

    /// Record a stylesheet `@import`.
    pub fn add_import(&mut self, request: impl Into<String>) {
        self.imports.push(request.into());
    }

    /// Stylesheet `@import` requests recorded so far.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Record a `url()` reference and return the placeholder standing in for
    /// its final URL.
    pub fn add_url(&mut self, request: impl Into<String>) -> String {
        self.urls.push(request.into());
        url_placeholder(self.urls.len() - 1)
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Emit a file into the output directory.
    pub fn emit(&mut self, filename: String, source: Vec<u8>) {
        self.emitted.push(EmittedFile { filename, source });
    }

    pub fn set_public_url(&mut self, url: String) {
        self.public_url = Some(url);
    }

    pub fn public_url(&self) -> Option<&str> {
        self.public_url.as_deref()
    }

    pub fn into_emitted(self) -> Vec<EmittedFile> {
        self.emitted
    }

    /// Context-relative directory of the resource, `/`-separated with a
    /// trailing slash (empty at the context root).
    pub fn relative_dir(&self) -> String {
        let dir = self.resource.parent().unwrap_or(self.context);
        match dir.strip_prefix(self.context) {
            Ok(rel) if rel.as_os_str().is_empty() => String::new(),
            Ok(rel) => {
                let parts: Vec<_> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect();
                format!("{}/", parts.join("/"))
            }
            Err(_) => String::new(),
        }
    }

    fn error(&self, loader: &str, message: impl Into<String>) -> Error {
        Error::loader(loader, self.resource, message)
    }

    fn text(&self, loader: &str, content: Content) -> Result<String> {
        match content {
            Content::Raw(bytes) => {
                String::from_utf8(bytes).map_err(|_| self.error(loader, "file is not valid UTF-8"))
            }
            Content::Stylesheet(text) | Content::Script(text) => Ok(text),
        }
    }

    fn unexpected(&self, loader: &str, content: &Content) -> Error {
        self.error(loader, format!("cannot process {}", content.kind()))
    }
}

/// Placeholder substituted into stylesheets for the `index`-th `url()`.
pub fn url_placeholder(index: usize) -> String {
    format!("__FARDEL_URL_{index}__")
}

pub trait Loader: Sync {
    fn name(&self) -> &'static str;

    fn load(&self, input: Content, options: &LoaderRef, ctx: &mut LoaderContext<'_>) -> Result<Content>;
}

static CSS: CssLoader = CssLoader;
static STYLE: StyleLoader = StyleLoader;
static HTML: HtmlLoader = HtmlLoader;
static FILE: FileLoader = FileLoader;
static RAW: RawLoader = RawLoader;

/// Look up a built-in loader by name.
pub fn builtin(name: &str) -> Option<&'static dyn Loader> {
    match name {
        "css-loader" => Some(&CSS),
        "style-loader" => Some(&STYLE),
        "html-loader" => Some(&HTML),
        "file-loader" => Some(&FILE),
        "raw-loader" => Some(&RAW),
        _ => None,
    }
}

/// Run `chain` (leftmost first) over `input`, right to left.
pub fn run_chain(chain: &[LoaderRef], input: Content, ctx: &mut LoaderContext<'_>) -> Result<Content> {
    let mut content = input;
    for loader_ref in chain.iter().rev() {
        let loader = builtin(&loader_ref.name).ok_or_else(|| Error::UnknownLoader {
            name: loader_ref.name.clone(),
        })?;
        tracing::trace!(loader = loader.name(), file = %ctx.resource.display(), "applying loader");
        content = loader.load(content, loader_ref, ctx)?;
    }
    Ok(content)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn chain_runs_right_to_left() {
        let resource = Path::new("/repo/src/a.css");
        let mut cx = ctx(resource, Path::new("/repo"));
        let chain = [loader("style-loader"), loader("css-loader")];
        let out = run_chain(&chain, Content::Raw(b"a { color: red; }".to_vec()), &mut cx).unwrap();
        let Content::Script(code) = out else {
            panic!("expected script");
        };
        assert!(code.contains("createElement(\"style\")"));
        assert!(code.contains("color: red"));
    }

    #[test]
    fn style_loader_needs_a_stylesheet() {
        let resource = Path::new("/repo/a.css");
        let mut cx = ctx(resource, Path::new("/repo"));
        let err = run_chain(&[loader("style-loader")], Content::Raw(b"x".to_vec()), &mut cx)
            .unwrap_err();
        assert!(matches!(err, Error::Loader { .. }));
    }

    #[test]
    fn relative_dir_has_trailing_slash() {
        let cx = ctx(Path::new("/repo/src/assets/a.png"), Path::new("/repo"));
        assert_eq!(cx.relative_dir(), "src/assets/");
        let cx = ctx(Path::new("/repo/a.png"), Path::new("/repo"));
        assert_eq!(cx.relative_dir(), "");
    }
}
