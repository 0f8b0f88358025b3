use fardel_config::LoaderRef;

use super::{Content, Loader, LoaderContext};
use crate::hash::content_hash;
use crate::script::js_string;
use crate::template::{interpolate, PathData};
use crate::Result;

const DEFAULT_NAME: &str = "[hash].[ext]";

/// Emits the file into the output directory and exports its public URL.
///
/// Options: `name` (template with `[name]`, `[ext]`, `[hash]`,
/// `[contenthash]`, `[path]`; default `[hash].[ext]`) and `output_path`
/// (directory prefix inside the output directory).
pub struct FileLoader;

impl Loader for FileLoader {
    fn name(&self) -> &'static str {
        "file-loader"
    }

    fn load(&self, input: Content, options: &LoaderRef, ctx: &mut LoaderContext<'_>) -> Result<Content> {
        let bytes = match input {
            Content::Raw(bytes) => bytes,
            Content::Stylesheet(text) | Content::Script(text) => text.into_bytes(),
        };

        let stem = ctx
            .resource
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let ext = ctx
            .resource
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let hash = content_hash(&bytes);

        let data = PathData::new()
            .with("name", stem)
            .with("ext", ext)
            .with("hash", hash.clone())
            .with("contenthash", hash)
            .with("path", ctx.relative_dir());

        let template = options.string("name").unwrap_or(DEFAULT_NAME);
        let mut filename = interpolate(template, &data, ctx.hash_length)?;
        if let Some(prefix) = options.string("output_path").or(options.string("outputPath")) {
            let prefix = prefix.trim_end_matches('/');
            if !prefix.is_empty() {
                filename = format!("{prefix}/{filename}");
            }
        }

        let url = format!("{}{}", ctx.public_path, filename);
        tracing::debug!(file = %ctx.resource.display(), %filename, "emitting file");
        ctx.emit(filename, bytes);
        ctx.set_public_url(url.clone());

        Ok(Content::Script(format!("module.exports = {};\n", js_string(&url))))
    }
}
