//! Tests for configuration validation.

use fardel_config::{
    ConfigError, ConfigValidator, FardelConfig, FsValidator, HtmlOptions, PluginKind, Rule,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn project() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::create_dir_all(dir.path().join("src/pages/index")).expect("create src");
    fs::write(dir.path().join("src/pages/index/index.js"), "").expect("write entry");
    dir
}

#[test]
fn validate_catches_missing_entry() {
    let dir = project();
    let cfg = FardelConfig::default().with_entry("page2", "src/pages/page2/index.js");

    let result = FsValidator::new(dir.path()).validate(&cfg);
    match result.unwrap_err() {
        ConfigError::EntryNotFound { name, path } => {
            assert_eq!(name, "page2");
            assert!(path.ends_with("src/pages/page2/index.js"));
        }
        other => panic!("expected EntryNotFound error, got {other:?}"),
    }
}

#[test]
fn validate_succeeds_when_entry_exists() {
    let dir = project();
    let cfg = FardelConfig::default().with_entry("index", "src/pages/index/index.js");

    assert!(FsValidator::new(dir.path()).validate(&cfg).is_ok());
}

#[test]
fn vendor_entries_are_not_checked_on_disk() {
    let dir = project();
    let cfg = FardelConfig::default()
        .with_entry("vendors", ["react", "react-dom"])
        .with_entry("index", "src/pages/index/index.js");

    assert!(FsValidator::new(dir.path()).validate(&cfg).is_ok());
}

#[test]
fn validate_catches_missing_include_dir() {
    let dir = project();
    let cfg = FardelConfig::default()
        .with_entry("index", "src/pages/index/index.js")
        .with_rule(Rule::new("\\.png$", ["file-loader"]).include("assets"));

    let result = FsValidator::new(dir.path()).validate(&cfg);
    assert!(matches!(
        result.unwrap_err(),
        ConfigError::IncludeDirNotFound { path } if path.ends_with("assets")
    ));
}

#[test]
fn validate_catches_missing_template() {
    let dir = project();
    let cfg = FardelConfig::default()
        .with_entry("index", "src/pages/index/index.js")
        .with_plugin(PluginKind::Html(HtmlOptions {
            template: Some(PathBuf::from("src/pages/index/index.html")),
            ..HtmlOptions::default()
        }));

    let result = FsValidator::new(dir.path()).validate(&cfg);
    assert!(matches!(
        result.unwrap_err(),
        ConfigError::TemplateNotFound { .. }
    ));
}

#[test]
fn disabled_plugins_are_not_validated() {
    let dir = project();
    let mut cfg = FardelConfig::default()
        .with_entry("index", "src/pages/index/index.js")
        .with_plugin(PluginKind::Html(HtmlOptions {
            template: Some(PathBuf::from("missing.html")),
            ..HtmlOptions::default()
        }));
    cfg.plugins[0].enabled = false;

    assert!(FsValidator::new(dir.path()).validate(&cfg).is_ok());
}

#[test]
fn duplicate_html_filenames_are_rejected() {
    let cfg = FardelConfig::default()
        .with_entry("index", "src/index.js")
        .with_plugin(PluginKind::Html(HtmlOptions::default()))
        .with_plugin(PluginKind::Html(HtmlOptions::default()));

    let err = fardel_config::validate_schema(&cfg).unwrap_err();
    assert!(err.to_string().contains("index.html"));
}

#[test]
fn html_chunks_must_be_entries() {
    let cfg = FardelConfig::default()
        .with_entry("index", "src/index.js")
        .with_plugin(PluginKind::Html(HtmlOptions {
            chunks: Some(vec!["vendors".to_string(), "index".to_string()]),
            ..HtmlOptions::default()
        }));

    let err = fardel_config::validate_schema(&cfg).unwrap_err();
    assert!(err.to_string().contains("vendors"));
}

#[test]
fn bad_loader_query_is_rejected() {
    let cfg = FardelConfig::default()
        .with_entry("index", "src/index.js")
        .with_rule(Rule::new("\\.html$", ["html-loader?{not json"]));

    assert!(matches!(
        fardel_config::validate_schema(&cfg).unwrap_err(),
        ConfigError::InvalidLoader { .. }
    ));
}
