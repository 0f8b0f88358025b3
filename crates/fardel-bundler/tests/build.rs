mod helpers;

use fardel_bundler::{AssetKind, Error};
use fardel_config::{
    AnalyzerOptions, CleanOptions, CommonsOptions, CompressionOptions, ExtractCssOptions,
    HtmlOptions, IgnoreOptions, PluginKind, Rule,
};
use helpers::{readable, Project};

fn two_pages() -> Project {
    let project = Project::new();
    project
        .file("src/shared.js", "export function add(a, b) {\n  return a + b;\n}\n")
        .file(
            "src/pages/index/index.js",
            "import { add } from '../../shared';\nconsole.log(add(1, 2));\n",
        )
        .file(
            "src/pages/page2/index.js",
            "const { add } = require('../../shared');\nconsole.log(add(3, 4));\n",
        );
    project
}

#[test]
fn output_names_are_stable_across_runs() {
    let project = two_pages();
    let config = || {
        let mut config = readable()
            .with_entry("index", "src/pages/index/index.js")
            .with_entry("page2", "src/pages/page2/index.js");
        config.output.filename = "js/[name]-[chunkhash:8].js".into();
        config
    };

    let first = project.build(config()).unwrap();
    let first_files = project.outputs();
    let second = project.build(config()).unwrap();

    let names = |r: &fardel_bundler::BuildResult| {
        r.assets.iter().map(|a| a.filename.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(&first), names(&second));
    assert_eq!(first.hash, second.hash);
    assert_eq!(first_files, project.outputs());
    assert_eq!(first.assets.len(), 2);
    assert!(first.assets[0].filename.starts_with("js/index-"));
    assert!(first.assets[1].filename.starts_with("js/page2-"));
}

#[test]
fn changed_source_changes_only_its_chunk_name() {
    let project = two_pages();
    let config = || {
        let mut config = readable()
            .with_entry("index", "src/pages/index/index.js")
            .with_entry("page2", "src/pages/page2/index.js");
        config.output.filename = "[name].[chunkhash].js".into();
        config
    };
    let before = project.build(config()).unwrap();
    project.file("src/pages/page2/index.js", "console.log('changed');\n");
    let after = project.build(config()).unwrap();

    assert_eq!(before.assets[0].filename, after.assets[0].filename);
    assert_ne!(before.assets[1].filename, after.assets[1].filename);
}

#[test]
fn chunks_define_modules_and_run_entries() {
    let project = two_pages();
    let config = readable().with_entry("index", "src/pages/index/index.js");
    project.build(config).unwrap();

    let bundle = project.read("index.js");
    assert!(bundle.contains("global.__fardel__ = {"));
    assert!(bundle.contains("\"./src/shared.js\": function (module, exports, require) {"));
    assert!(bundle.contains("require.i(require(\"./src/shared.js\"))"));
    assert!(bundle.ends_with("__fardel__.run([\"./src/pages/index/index.js\"]);\n"));
}

#[test]
fn colliding_outputs_fail_the_build() {
    let project = Project::new();
    project
        .file("src/logo.js", "require('./logo.png');\n")
        .file("src/logo.png", "PNG");
    let mut config = readable()
        .with_entry("logo", "src/logo.js")
        .with_rule(Rule::new(r"\.png$", ["file-loader?name=[name].[ext]"]));
    config.output.filename = "[name].png".into();

    match project.build(config) {
        Err(Error::OutputCollision { filename, .. }) => assert_eq!(filename, "logo.png"),
        other => panic!("expected an output collision, got {other:?}"),
    }
    assert!(project.outputs().is_empty());
}

#[test]
fn entries_with_identical_chunks_need_distinct_names() {
    let project = Project::new();
    project.file("src/a.js", "console.log('a');\n");
    let mut config = readable()
        .with_entry("index", "src/a.js")
        .with_entry("page2", "src/a.js");
    config.output.filename = "js/[chunkhash].js".into();

    match project.build(config) {
        Err(Error::OutputCollision { first, second, .. }) => {
            assert_eq!(first, "chunk 'index'");
            assert_eq!(second, "chunk 'page2'");
        }
        other => panic!("expected an output collision, got {other:?}"),
    }
    assert!(project.outputs().is_empty());
}

#[test]
fn first_matching_rule_wins() {
    let project = Project::new();
    project
        .file("src/index.js", "require('./note.txt');\n")
        .file("src/note.txt", "hello");
    let config = readable()
        .with_entry("index", "src/index.js")
        .with_rule(Rule::new(r"\.txt$", ["raw-loader"]))
        .with_rule(Rule::new(r"\.txt$", ["file-loader"]));

    let result = project.build(config).unwrap();
    assert!(project.read("index.js").contains("module.exports = \"hello\";"));
    assert!(result.assets.iter().all(|a| a.kind != AssetKind::Media));
}

#[test]
fn exclude_beats_include() {
    let project = Project::new();
    project
        .file("src/index.js", "require('./a.txt'); require('./vendor/b.txt');\n")
        .file("src/a.txt", "A")
        .file("src/vendor/b.txt", "B");
    let config = readable()
        .with_entry("index", "src/index.js")
        .with_rule(
            Rule::new(r"\.txt$", ["file-loader?name=[name].[ext]"])
                .include("src")
                .exclude("src/vendor"),
        )
        .with_rule(Rule::new(r"\.txt$", ["raw-loader"]));

    project.build(config).unwrap();
    assert_eq!(project.outputs(), ["a.txt", "index.js"]);
    assert!(project.read("index.js").contains("module.exports = \"B\";"));
}

#[test]
fn unmatched_file_type_is_an_error() {
    let project = Project::new();
    project
        .file("src/index.js", "require('./style.scss');\n")
        .file("src/style.scss", "$a: 1;");
    let config = readable().with_entry("index", "src/index.js");
    assert!(matches!(
        project.build(config),
        Err(Error::NoMatchingRule { .. })
    ));
}

#[test]
fn missing_entry_is_reported() {
    let project = Project::new();
    let config = readable().with_entry("index", "src/missing.js");
    match project.build(config) {
        Err(Error::ResolutionFailed { request, importer }) => {
            assert_eq!(request, "src/missing.js");
            assert_eq!(importer, "entry 'index'");
        }
        other => panic!("expected resolution failure, got {other:?}"),
    }
}

#[test]
fn commons_chunk_takes_vendor_and_shared_modules() {
    let project = two_pages();
    project
        .file("node_modules/lib/package.json", r#"{ "main": "lib.js" }"#)
        .file("node_modules/lib/lib.js", "module.exports = 'lib';\n")
        .file(
            "src/pages/index/index.js",
            "require('lib');\nrequire('../../shared');\n",
        )
        .file(
            "src/pages/page2/index.js",
            "require('lib');\nrequire('../../shared');\n",
        );
    let config = readable()
        .with_entry("vendors", ["lib"])
        .with_entry("index", "src/pages/index/index.js")
        .with_entry("page2", "src/pages/page2/index.js")
        .with_plugin(PluginKind::Commons(CommonsOptions {
            name: "vendors".into(),
            ..CommonsOptions::default()
        }));

    let result = project.build(config).unwrap();
    let vendors = project.read("vendors.js");
    let index = project.read("index.js");

    assert!(vendors.contains("global.__fardel__ = {"));
    assert!(vendors.contains("\"./node_modules/lib/lib.js\": function"));
    assert!(vendors.contains("\"./src/shared.js\": function"));
    assert!(!index.contains("global.__fardel__ = {"));
    assert!(!index.contains("\"./src/shared.js\": function"));
    assert!(index.contains("require(\"./node_modules/lib/lib.js\")"));

    let commons: Vec<_> = result.chunks.iter().filter(|c| c.is_commons).collect();
    assert_eq!(commons.len(), 1);
    assert_eq!(commons[0].name, "vendors");
}

#[test]
fn html_page_loads_selected_chunks_in_order() {
    let project = two_pages();
    project
        .file("node_modules/lib/index.js", "module.exports = 1;\n")
        .file(
            "src/pages/index/index.html",
            "<!DOCTYPE html>\n<html>\n<head>\n<title>{{ title }}</title>\n</head>\n<body>\n<!-- app -->\n<div id=\"root\"></div>\n</body>\n</html>\n",
        );
    let mut config = readable()
        .with_entry("index", "src/pages/index/index.js")
        .with_entry("vendors", ["lib"])
        .with_entry("page2", "src/pages/page2/index.js")
        .with_plugin(PluginKind::Commons(CommonsOptions {
            name: "vendors".into(),
            ..CommonsOptions::default()
        }))
        .with_plugin(PluginKind::Html(HtmlOptions {
            template: Some("src/pages/index/index.html".into()),
            filename: "index.html".into(),
            chunks: Some(vec!["index".into(), "vendors".into()]),
            title: Some("Home".into()),
            minify: fardel_config::HtmlMinifyOptions {
                remove_comments: true,
                collapse_whitespace: false,
            },
            ..HtmlOptions::default()
        }));
    config.output.filename = "js/[name].js".into();
    config.output.public_path = "/static/".into();

    project.build(config).unwrap();
    let html = project.read("index.html");
    assert!(html.contains("<title>Home</title>"));
    assert!(!html.contains("<!-- app -->"));
    assert!(html.contains(
        "<script type=\"text/javascript\" src=\"/static/js/vendors.js\"></script>\
         <script type=\"text/javascript\" src=\"/static/js/index.js\"></script></body>"
    ));
    assert!(!html.contains("page2.js"));
}

#[test]
fn extracted_stylesheets_become_css_files() {
    let project = Project::new();
    project
        .file("src/index.js", "import './app.css';\n")
        .file("src/app.css", "@import './base.css';\n.app { background: url(./bg.png); }\n")
        .file("src/base.css", "body { margin: 0; }\n")
        .file("src/bg.png", "PNG");
    let config = readable()
        .with_entry("index", "src/index.js")
        .with_rule(Rule::new(r"\.css$", ["css-loader"]).extract_with_fallback("style-loader"))
        .with_rule(Rule::new(r"\.png$", ["file-loader?name=img/[name].[ext]"]))
        .with_plugin(PluginKind::ExtractCss(ExtractCssOptions {
            filename: "css/[name].css".into(),
        }))
        .with_plugin(PluginKind::Html(HtmlOptions::default()));

    project.build(config).unwrap();
    let css = project.read("css/index.css");
    let base = css.find("body { margin: 0; }").expect("base stylesheet");
    let app = css.find(".app { background: url(img/bg.png); }").expect("app stylesheet");
    assert!(base < app);
    assert!(!project.read("index.js").contains("margin: 0"));
    assert!(project
        .read("index.html")
        .contains("<link href=\"css/index.css\" rel=\"stylesheet\"></head>"));
    assert_eq!(project.read("img/bg.png"), "PNG");
}

#[test]
fn stylesheets_fall_back_to_style_injection() {
    let project = Project::new();
    project
        .file("src/index.js", "require('./app.css');\n")
        .file("src/app.css", ".app { color: red; }\n");
    let config = readable()
        .with_entry("index", "src/index.js")
        .with_rule(Rule::new(r"\.css$", ["css-loader"]).extract_with_fallback("style-loader"));

    project.build(config).unwrap();
    assert_eq!(project.outputs(), ["index.js"]);
    let bundle = project.read("index.js");
    assert!(bundle.contains("document.createElement(\"style\")"));
    assert!(bundle.contains(".app { color: red; }"));
}

#[test]
fn mode_is_defined_for_scripts() {
    let project = Project::new();
    project.file(
        "src/index.js",
        "if (process.env.NODE_ENV !== 'production') { console.log('dev'); }\n",
    );
    let config = readable().with_entry("index", "src/index.js");
    project.build(config).unwrap();
    assert!(project
        .read("index.js")
        .contains("if (\"development\" !== 'production')"));
}

#[test]
fn production_builds_are_minified() {
    let project = Project::new();
    project.file(
        "src/index.js",
        "/* banner */\nfunction greet(person) {\n  return 'hello ' + person;\n}\nconsole.log(greet('you'));\n",
    );
    let config = fardel_config::FardelConfig::default().with_entry("index", "src/index.js");
    let result = project.build(config).unwrap();

    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    let bundle = project.read("index.js");
    assert!(!bundle.contains("banner"));
    assert!(bundle.contains("__fardel__"));
}

#[test]
fn ignored_requests_throw_at_runtime() {
    let project = Project::new();
    project.file(
        "src/index.js",
        "try { require('./locale'); } catch (e) {}\nrequire('./real');\n",
    );
    project.file("src/real.js", "module.exports = 1;\n");
    let config = readable()
        .with_entry("index", "src/index.js")
        .with_plugin(PluginKind::Ignore(IgnoreOptions {
            resource: r"^\./locale$".into(),
            context: None,
        }));

    project.build(config).unwrap();
    let bundle = project.read("index.js");
    assert!(bundle.contains("require.m(\"./locale\")"));
    assert!(bundle.contains("require(\"./src/real.js\")"));
}

#[test]
fn clean_removes_stale_output_first() {
    let project = Project::new();
    project
        .file("src/index.js", "console.log(1);\n")
        .file("build/stale.js", "old");
    let config = readable()
        .with_entry("index", "src/index.js")
        .with_plugin(PluginKind::Clean(CleanOptions {
            paths: vec!["build".into()],
        }));

    project.build(config).unwrap();
    assert_eq!(project.outputs(), ["index.js"]);
}

#[test]
fn compression_adds_gzip_variants() {
    let project = Project::new();
    let body = "console.log('a fairly repetitive line of code');\n".repeat(40);
    project.file("src/index.js", &body);
    let config = readable()
        .with_entry("index", "src/index.js")
        .with_plugin(PluginKind::Compression(CompressionOptions {
            test: Some(r"\.js$".into()),
            threshold: 1024,
            ..CompressionOptions::default()
        }));

    let result = project.build(config).unwrap();
    assert_eq!(project.outputs(), ["index.js", "index.js.gz"]);
    assert_eq!(
        result.asset("index.js.gz").map(|a| a.kind),
        Some(AssetKind::Compressed)
    );
}

#[test]
fn analyzer_reports_after_emit() {
    let project = two_pages();
    let config = readable()
        .with_entry("index", "src/pages/index/index.js")
        .with_plugin(PluginKind::Analyzer(AnalyzerOptions {
            report_filename: "report.html".into(),
            stats_filename: Some("stats.json".into()),
        }));

    project.build(config).unwrap();
    let report = project.read("report.html");
    assert!(report.contains("shared.js"));
    let stats: serde_json::Value = serde_json::from_str(&project.read("stats.json")).unwrap();
    assert_eq!(stats["chunks"][0]["name"], "index");
    assert_eq!(stats["chunks"][0]["modules"].as_array().map(Vec::len), Some(2));
}
