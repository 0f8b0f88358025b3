use std::ops::Range;
use std::sync::LazyLock;

use fardel_config::LoaderRef;
use regex::{Captures, Regex};

use super::{Content, Loader, LoaderContext};
use crate::minify::minify_css;
use crate::resolve::is_path_request;
use crate::Result;

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s+(?:url\(\s*)?["']?([^"')\s;]+)["']?\s*\)?\s*([^;]*);"#)
        .expect("import regex is valid")
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*["']?([^"')]+?)["']?\s*\)"#).expect("url regex is valid")
});

static COMMENT_OR_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|/\*.*?(?:\*/|$)"#)
        .expect("comment regex is valid")
});

/// Byte ranges of the comments in `css`.
fn comments(css: &str) -> Vec<Range<usize>> {
    COMMENT_OR_STRING
        .find_iter(css)
        .filter(|m| m.as_str().starts_with("/*"))
        .map(|m| m.range())
        .collect()
}

fn commented(comments: &[Range<usize>], caps: &Captures<'_>) -> bool {
    caps.get(0)
        .is_some_and(|m| comments.iter().any(|c| c.contains(&m.start())))
}

/// Interprets `@import` and `url()`.
///
/// Local references become dependencies of the module; `url()`s are replaced
/// by placeholders that the graph swaps for the referenced file's public URL.
/// Options: `minimize`.
pub struct CssLoader;

impl Loader for CssLoader {
    fn name(&self) -> &'static str {
        "css-loader"
    }

    fn load(&self, input: Content, options: &LoaderRef, ctx: &mut LoaderContext<'_>) -> Result<Content> {
        if let Content::Script(_) = input {
            return Err(ctx.unexpected(self.name(), &input));
        }
        let source = ctx.text(self.name(), input)?;

        let skipped = comments(&source);
        let without_imports = IMPORT.replace_all(&source, |caps: &Captures<'_>| {
            if commented(&skipped, caps) {
                return caps[0].to_string();
            }
            let target = &caps[1];
            let media = caps[2].trim();
            if is_external(target) || !media.is_empty() {
                return caps[0].to_string();
            }
            ctx.add_import(to_request(target));
            String::new()
        });

        let skipped = comments(&without_imports);
        let rewritten = URL.replace_all(&without_imports, |caps: &Captures<'_>| {
            if commented(&skipped, caps) {
                return caps[0].to_string();
            }
            let target = caps[1].trim();
            if is_external(target) || target.starts_with('/') {
                return caps[0].to_string();
            }
            let (path, suffix) = split_suffix(target);
            let placeholder = ctx.add_url(to_request(path));
            format!("url({placeholder}{suffix})")
        });

        let mut css = rewritten.into_owned();
        if options.flag("minimize") {
            match minify_css(&css) {
                Some(minified) => css = minified,
                None => tracing::warn!(
                    file = %ctx.resource.display(),
                    "stylesheet did not parse, leaving it unminified"
                ),
            }
        }

        Ok(Content::Stylesheet(css))
    }
}

fn is_external(target: &str) -> bool {
    target.starts_with("data:")
        || target.starts_with("http:")
        || target.starts_with("https:")
        || target.starts_with("//")
        || target.starts_with('#')
}

/// `~pkg/file` is a module request; anything else is relative to the sheet.
fn to_request(target: &str) -> String {
    if let Some(module) = target.strip_prefix('~') {
        module.to_string()
    } else if is_path_request(target) {
        target.to_string()
    } else {
        format!("./{target}")
    }
}

/// Split `font.woff?#iefix` into the file part and its query/fragment.
fn split_suffix(target: &str) -> (&str, &str) {
    match target.find(['?', '#']) {
        Some(pos) => target.split_at(pos),
        None => (target, ""),
    }
}
