//! Declaration types: entries, output, resolution, rules and plugin steps.

mod entry;
mod helpers;
mod output;
mod plugin;
mod rule;

pub use entry::EntrySpec;
pub use output::{OutputOptions, ResolveOptions};
pub(crate) use output::is_chunk_specific;
pub use plugin::{
    AnalyzerOptions, CleanOptions, CommonsOptions, CompressionAlgorithm, CompressionOptions,
    DefineOptions, ExtractCssOptions, HtmlMinifyOptions, HtmlOptions, IgnoreOptions, Inject,
    MinifyOptions, PluginKind, PluginOptions,
};
pub use rule::{parse_loader_string, LoaderRef, LoaderSpec, Rule};
