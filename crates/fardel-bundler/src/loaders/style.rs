use fardel_config::LoaderRef;

use super::{Content, Loader, LoaderContext};
use crate::script::js_string;
use crate::Result;

/// Turns a stylesheet into a script that appends a `<style>` element.
///
/// Stylesheet `@import`s are required first so their rules land earlier in
/// the document.
pub struct StyleLoader;

impl Loader for StyleLoader {
    fn name(&self) -> &'static str {
        "style-loader"
    }

    fn load(&self, input: Content, _options: &LoaderRef, ctx: &mut LoaderContext<'_>) -> Result<Content> {
        let css = match input {
            Content::Stylesheet(css) => css,
            other => return Err(ctx.unexpected(self.name(), &other)),
        };

        let mut code = String::new();
        for request in ctx.imports() {
            code.push_str(&format!("require({});\n", js_string(request)));
        }
        code.push_str(&format!("var css = {};\n", js_string(&css)));
        code.push_str(
            "if (typeof document !== \"undefined\") {\n  \
             var style = document.createElement(\"style\");\n  \
             style.appendChild(document.createTextNode(css));\n  \
             (document.head || document.getElementsByTagName(\"head\")[0]).appendChild(style);\n\
             }\n\
             module.exports = css;\n",
        );

        Ok(Content::Script(code))
    }
}
