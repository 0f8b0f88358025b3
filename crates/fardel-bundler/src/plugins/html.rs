use std::fs;
use std::path::{Path, PathBuf};

use fardel_config::{HtmlOptions, Inject};
use minijinja::{context, AutoEscape, Environment};

use super::{Plugin, PluginPhase};
use crate::compilation::{Asset, AssetKind, Compilation};
use crate::markup::{escape, insert_before_close, minify, MinifyHtml};
use crate::{Error, Result};

const DEFAULT_TITLE: &str = "Fardel App";

const DEFAULT_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{{ title }}</title>
  </head>
  <body>
  </body>
</html>
"#;

/// Emits an HTML page that loads the chunks of selected entries.
///
/// Templates are rendered with minijinja and see `title`, `public_path`,
/// `chunks`, `scripts` and `styles`. Stylesheet links go before `</head>`;
/// script tags go before `</body>` or `</head>` depending on `inject`.
pub struct HtmlPlugin {
    options: HtmlOptions,
    template: Option<PathBuf>,
}

impl HtmlPlugin {
    pub fn new(options: &HtmlOptions, context: &Path) -> Self {
        Self {
            options: options.clone(),
            template: options.template.as_ref().map(|t| context.join(t)),
        }
    }

    fn source(&self) -> Result<String> {
        match &self.template {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::plugin(
                    self.name(),
                    format!("cannot read template '{}': {e}", path.display()),
                )
            }),
            None => Ok(DEFAULT_PAGE.to_string()),
        }
    }

    fn selected<'a>(&self, compilation: &'a Compilation) -> Vec<&'a str> {
        compilation
            .chunks
            .load_order()
            .into_iter()
            .filter(|chunk| match &self.options.chunks {
                Some(names) => names.iter().any(|n| *n == chunk.name),
                None => true,
            })
            .map(|chunk| chunk.name.as_str())
            .collect()
    }
}

impl Plugin for HtmlPlugin {
    fn name(&self) -> &'static str {
        "html"
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Pages
    }

    fn process_assets(&self, compilation: &mut Compilation) -> Result<()> {
        let chunks = self.selected(compilation);
        let urls = |kind: AssetKind| -> Vec<String> {
            chunks
                .iter()
                .flat_map(|name| compilation.chunk_assets(name, kind))
                .map(|asset| compilation.url(asset))
                .collect()
        };
        let scripts = urls(AssetKind::Script);
        let styles = urls(AssetKind::Stylesheet);

        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        let title = self.options.title.as_deref().unwrap_or(DEFAULT_TITLE);
        let mut html = env
            .render_str(
                &self.source()?,
                context! {
                    title => title,
                    public_path => &compilation.public_path,
                    chunks => &chunks,
                    scripts => &scripts,
                    styles => &styles,
                },
            )
            .map_err(|e| Error::plugin(self.name(), format!("template failed to render: {e}")))?;

        if self.options.inject != Inject::Disabled {
            let links: String = styles
                .iter()
                .map(|url| format!("<link href=\"{}\" rel=\"stylesheet\">", escape(url)))
                .collect();
            let tags: String = scripts
                .iter()
                .map(|url| format!("<script type=\"text/javascript\" src=\"{}\"></script>", escape(url)))
                .collect();
            insert_before_close(&mut html, "head", &links);
            let place = if self.options.inject == Inject::Head { "head" } else { "body" };
            insert_before_close(&mut html, place, &tags);
        }

        let minify_options = MinifyHtml {
            remove_comments: self.options.minify.remove_comments,
            collapse_whitespace: self.options.minify.collapse_whitespace,
        };
        if minify_options != MinifyHtml::default() {
            html = minify(&html, minify_options);
        }

        tracing::debug!(page = %self.options.filename, scripts = scripts.len(), "page rendered");
        compilation.assets.push(Asset::named(
            self.options.filename.clone(),
            html.into_bytes(),
            AssetKind::Page,
            format!("html page '{}'", self.options.filename),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{Chunk, ChunkSet};
    use crate::graph::ModuleGraph;
    use tempfile::TempDir;

    fn compilation() -> Compilation {
        let chunk = Chunk {
            name: "index".into(),
            id: 0,
            roots: Vec::new(),
            modules: Vec::new(),
            has_runtime: true,
            is_commons: false,
            filename_template: "js/[name].js".into(),
        };
        let mut c = Compilation::new(ModuleGraph::default(), [chunk].into_iter().collect(), "/", 8);
        c.assets = vec![
            Asset::named("js/index.js", b"i".to_vec(), AssetKind::Script, "i"),
            Asset::named("index.css", b"c".to_vec(), AssetKind::Stylesheet, "c"),
        ];
        for asset in &mut c.assets {
            asset.chunk = Some("index".into());
        }
        c
    }

    fn page(c: &Compilation) -> String {
        let asset = c.assets.iter().find(|a| a.kind == AssetKind::Page).unwrap();
        String::from_utf8(asset.source.clone()).unwrap()
    }

    #[test]
    fn default_page_gets_tags() {
        let mut c = compilation();
        HtmlPlugin::new(&HtmlOptions::default(), Path::new("/repo"))
            .process_assets(&mut c)
            .unwrap();
        let html = page(&c);
        assert!(html.contains("<title>Fardel App</title>"));
        assert!(html.contains("<link href=\"/index.css\" rel=\"stylesheet\"></head>"));
        assert!(html.contains(
            "<script type=\"text/javascript\" src=\"/js/index.js\"></script></body>"
        ));
    }

    #[test]
    fn head_injection_and_chunk_filter() {
        let options = HtmlOptions {
            inject: Inject::Head,
            ..HtmlOptions::default()
        };
        let mut c = compilation();
        HtmlPlugin::new(&options, Path::new("/repo")).process_assets(&mut c).unwrap();
        assert!(page(&c).contains("</script></head>"));

        let options = HtmlOptions {
            chunks: Some(vec!["other".into()]),
            ..HtmlOptions::default()
        };
        let mut c = compilation();
        HtmlPlugin::new(&options, Path::new("/repo")).process_assets(&mut c).unwrap();
        let html = page(&c);
        assert!(!html.contains("<script"));
        assert!(!html.contains("<link"));
    }

    #[test]
    fn pages_without_chunks_have_no_tags() {
        let mut c = Compilation::new(ModuleGraph::default(), ChunkSet::default(), "/", 8);
        HtmlPlugin::new(&HtmlOptions::default(), Path::new("/repo"))
            .process_assets(&mut c)
            .unwrap();
        assert!(!page(&c).contains("<script"));
    }

    #[test]
    fn template_variables_and_minify() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("page.html"),
            "<html>\n<head><title>{{ title }}</title></head>\n<!-- note -->\n<body>\n</body>\n</html>",
        )
        .unwrap();
        let options = HtmlOptions {
            template: Some("page.html".into()),
            filename: "out.html".into(),
            title: Some("A & B".into()),
            inject: Inject::Disabled,
            minify: fardel_config::HtmlMinifyOptions {
                remove_comments: true,
                collapse_whitespace: true,
            },
            ..HtmlOptions::default()
        };
        let mut c = compilation();
        HtmlPlugin::new(&options, dir.path()).process_assets(&mut c).unwrap();
        assert_eq!(
            page(&c),
            "<html><head><title>A &amp; B</title></head><body></body></html>"
        );
    }

    #[test]
    fn missing_template_is_an_error() {
        let options = HtmlOptions {
            template: Some("nope.html".into()),
            ..HtmlOptions::default()
        };
        let mut c = compilation();
        assert!(HtmlPlugin::new(&options, Path::new("/does/not/exist"))
            .process_assets(&mut c)
            .is_err());
    }
}
