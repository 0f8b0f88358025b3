use std::path::PathBuf;

// Helper defaults
pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_output_path() -> PathBuf {
    PathBuf::from("build")
}

pub(crate) fn default_filename() -> String {
    "[name].js".to_string()
}

pub(crate) fn default_hash_length() -> usize {
    20
}

pub(crate) fn default_extensions() -> Vec<String> {
    vec![".js".to_string(), ".jsx".to_string(), ".json".to_string()]
}

pub(crate) fn default_modules() -> Vec<PathBuf> {
    vec![PathBuf::from("node_modules")]
}

pub(crate) fn default_css_filename() -> String {
    "[name].css".to_string()
}

pub(crate) fn default_html_filename() -> String {
    "index.html".to_string()
}

pub(crate) fn default_compression_asset() -> String {
    "[path].gz[query]".to_string()
}

pub(crate) fn default_min_ratio() -> f64 {
    0.8
}

pub(crate) fn default_report_filename() -> String {
    "report.html".to_string()
}
