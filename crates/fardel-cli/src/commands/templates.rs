//! Files written by `fardel init`.

pub const CONFIG: &str = r#"# fardel build configuration
mode = "production"

[entries]
index = "src/index.js"

[output]
path = "build"
filename = "js/[name]-[chunkhash].js"
public_path = ""

[resolve]
extensions = [".js", ".json"]
modules = ["node_modules"]

# The first matching rule wins.
[[rules]]
test = '\.css$'
use = ["css-loader"]
extract = true
fallback = "style-loader"

[[rules]]
test = '\.(png|jpe?g|gif|svg)$'
use = ["file-loader?name=assets/[name]-[hash].[ext]"]

[[plugins]]
name = "clean"
paths = ["build"]

[[plugins]]
name = "extract-css"
filename = "css/[name]-[contenthash].css"

[[plugins]]
name = "html"
template = "src/index.html"
filename = "index.html"

[profiles.development]
minimize = false
output = { filename = "js/[name].js" }
"#;

pub const INDEX_JS: &str = r#"import './style.css';

const root = document.getElementById('app');
root.textContent = 'Hello from fardel (' + process.env.NODE_ENV + ')';
"#;

pub const STYLE_CSS: &str = r#"body {
  font-family: system-ui, sans-serif;
  margin: 2rem;
}
"#;

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{{ title }}</title>
  </head>
  <body>
    <div id="app"></div>
  </body>
</html>
"#;

/// Starter sources, relative to the project directory.
pub const SOURCES: &[(&str, &str)] = &[
    ("src/index.js", INDEX_JS),
    ("src/style.css", STYLE_CSS),
    ("src/index.html", INDEX_HTML),
];
