use fardel_config::LoaderRef;

use super::{Content, Loader, LoaderContext};
use crate::script::js_string;
use crate::Result;

/// Exports the file's text as a string.
pub struct RawLoader;

impl Loader for RawLoader {
    fn name(&self) -> &'static str {
        "raw-loader"
    }

    fn load(&self, input: Content, _options: &LoaderRef, ctx: &mut LoaderContext<'_>) -> Result<Content> {
        let text = ctx.text(self.name(), input)?;
        Ok(Content::Script(format!("module.exports = {};\n", js_string(&text))))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use std::path::Path;

    #[test]
    fn exports_text() {
        let resource = Path::new("/repo/notes.txt");
        let mut cx = ctx(resource, Path::new("/repo"));
        let out = RawLoader
            .load(Content::Raw(b"line \"one\"\n".to_vec()), &loader("raw-loader"), &mut cx)
            .unwrap();
        assert_eq!(out, Content::Script("module.exports = \"line \\\"one\\\"\\n\";\n".into()));
    }

    #[test]
    fn binary_input_is_rejected() {
        let resource = Path::new("/repo/a.bin");
        let mut cx = ctx(resource, Path::new("/repo"));
        assert!(RawLoader
            .load(Content::Raw(vec![0xff, 0xfe]), &loader("raw-loader"), &mut cx)
            .is_err());
    }
}
