use std::sync::LazyLock;

use fardel_config::LoaderRef;
use regex::Regex;

use super::{Content, Loader, LoaderContext};
use crate::markup::{minify, MinifyHtml};
use crate::resolve::is_path_request;
use crate::script::js_string;
use crate::Result;

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<img\b[^>]*?\bsrc\s*=\s*)(["'])([^"']+)(["'])"#).expect("img regex is valid")
});

/// Exports markup as a string.
///
/// Local `<img src>` references are turned into `require` calls so the
/// images go through their own rules. Options: `minimize`.
pub struct HtmlLoader;

impl Loader for HtmlLoader {
    fn name(&self) -> &'static str {
        "html-loader"
    }

    fn load(&self, input: Content, options: &LoaderRef, ctx: &mut LoaderContext<'_>) -> Result<Content> {
        if let Content::Script(_) = input {
            return Err(ctx.unexpected(self.name(), &input));
        }
        let mut html = ctx.text(self.name(), input)?;
        if options.flag("minimize") {
            html = minify(&html, MinifyHtml::all());
        }

        let mut parts = Vec::new();
        let mut last = 0;
        for caps in IMG_SRC.captures_iter(&html) {
            let Some(src) = caps.get(3) else {
                continue;
            };
            let target = src.as_str();
            if !is_local(target) {
                continue;
            }
            let request = if is_path_request(target) {
                target.to_string()
            } else {
                format!("./{target}")
            };
            parts.push(js_string(&html[last..src.start()]));
            parts.push(format!("require({})", js_string(&request)));
            last = src.end();
        }
        parts.push(js_string(&html[last..]));

        Ok(Content::Script(format!("module.exports = {};\n", parts.join(" + "))))
    }
}

fn is_local(target: &str) -> bool {
    !(target.starts_with("data:")
        || target.starts_with("http:")
        || target.starts_with("https:")
        || target.starts_with("//")
        || target.starts_with('/')
        || target.starts_with('#')
        || target.contains("{{")
        || target.contains("<%"))
}
