//! Module graph construction.
//!
//! Each entry is walked depth first. Every reachable file is dispatched to
//! its loader chain, scripts are lowered to CommonJS and their requests are
//! resolved and rewritten to module ids. Modules are stored in post-order, so
//! a module's dependencies always precede it.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use fardel_config::EntrySpec;
use indexmap::IndexMap;

use crate::loaders::{run_chain, url_placeholder, Content, EmittedFile, LoaderContext};
use crate::plugins::PluginRegistry;
use crate::resolve::{is_path_request, module_id, Resolver};
use crate::rules::{Dispatch, NativeKind, RuleSet};
use crate::script::{find_requires, js_string, lower_esm, rewrite_requires};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Script,
    Json,
    /// Stylesheet whose text was extracted out of the script bundle
    Style,
    /// File emitted by a loader; the module exports its public URL
    Asset,
}

#[derive(Debug, Clone)]
pub struct Module {
    pub id: String,
    pub path: PathBuf,
    pub kind: ModuleKind,
    /// Factory body, executed with `module`, `exports` and `require` in scope
    pub code: String,
    /// Extracted stylesheet text
    pub css: Option<String>,
    /// Ids of the modules this one requires, in first-use order
    pub dependencies: Vec<String>,
    pub public_url: Option<String>,
}

impl Module {
    pub fn size(&self) -> usize {
        self.code.len() + self.css.as_ref().map_or(0, String::len)
    }
}

/// One declared entry and the modules it reaches.
#[derive(Debug, Clone)]
pub struct EntryModules {
    /// Modules executed when the entry's chunk loads
    pub roots: Vec<String>,
    /// Every reachable module, dependencies first
    pub modules: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: IndexMap<String, Module>,
    entries: IndexMap<String, EntryModules>,
    emitted: Vec<EmittedFile>,
}

/// What graph construction needs from the build.
pub struct GraphContext<'a> {
    pub resolver: &'a Resolver,
    pub rules: &'a RuleSet,
    pub plugins: &'a PluginRegistry,
    pub public_path: &'a str,
    pub hash_length: usize,
}

impl ModuleGraph {
    /// Walk every entry and build the graph.
    pub fn build(entries: &IndexMap<String, EntrySpec>, cx: &GraphContext<'_>) -> Result<Self> {
        let mut builder = Builder {
            cx,
            extracting: cx.plugins.has_extract_css(),
            graph: ModuleGraph::default(),
            visiting: HashSet::new(),
        };

        for (name, spec) in entries {
            let mut roots = Vec::new();
            match spec {
                EntrySpec::Path(path) => {
                    let file = cx.resolver.resolve_entry(name, path)?;
                    roots.push(builder.visit(&file)?);
                }
                EntrySpec::Many(requests) => {
                    for request in requests {
                        let file = if is_path_request(request) {
                            cx.resolver.resolve_entry(name, request)?
                        } else {
                            cx.resolver
                                .resolve(request, cx.resolver.context())
                                .map_err(|_| Error::ResolutionFailed {
                                    request: request.clone(),
                                    importer: format!("entry '{name}'"),
                                })?
                        };
                        roots.push(builder.visit(&file)?);
                    }
                }
            }
            let modules = builder.graph.reachable(&roots);
            tracing::debug!(entry = %name, modules = modules.len(), "entry walked");
            builder
                .graph
                .entries
                .insert(name.clone(), EntryModules { roots, modules });
        }

        Ok(builder.graph)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.get(id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn entries(&self) -> &IndexMap<String, EntryModules> {
        &self.entries
    }

    /// Files emitted by loaders, in discovery order.
    pub fn emitted(&self) -> &[EmittedFile] {
        &self.emitted
    }

    /// Every module reachable from `roots`, dependencies first.
    pub fn reachable(&self, roots: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        for root in roots {
            self.post_order(root, &mut seen, &mut order);
        }
        order
    }

    fn post_order(&self, id: &str, seen: &mut HashSet<String>, order: &mut Vec<String>) {
        if !seen.insert(id.to_string()) {
            return;
        }
        if let Some(module) = self.modules.get(id) {
            for dep in &module.dependencies {
                self.post_order(dep, seen, order);
            }
        }
        order.push(id.to_string());
    }
}

struct Builder<'a, 'cx> {
    cx: &'a GraphContext<'cx>,
    extracting: bool,
    graph: ModuleGraph,
    visiting: HashSet<String>,
}

/// A loader chain's result plus what the chain recorded.
struct Loaded {
    content: Content,
    extracted: bool,
    native: Option<NativeKind>,
    urls: Vec<String>,
    imports: Vec<String>,
    public_url: Option<String>,
    emitted: Vec<EmittedFile>,
}

impl Builder<'_, '_> {
    fn visit(&mut self, path: &Path) -> Result<String> {
        let cx = self.cx;
        let context = cx.resolver.context();
        let id = module_id(context, path);
        if self.graph.modules.contains_key(&id) || !self.visiting.insert(id.clone()) {
            return Ok(id);
        }

        let loaded = self.load(path)?;
        self.graph.emitted.extend(loaded.emitted);
        let dir = path.parent().unwrap_or(context).to_path_buf();
        let mut dependencies = Vec::new();

        // url() targets are modules too; their public URL replaces the placeholder
        let mut url_values = Vec::with_capacity(loaded.urls.len());
        for request in &loaded.urls {
            let target = self.cx.resolver.resolve(request, &dir)?;
            let dep = self.visit(&target)?;
            let url = self
                .graph
                .modules
                .get(&dep)
                .and_then(|m| m.public_url.clone())
                .ok_or_else(|| {
                    Error::loader(
                        "css-loader",
                        path,
                        format!("url({request}) resolves to {dep}, which has no public URL; route it through file-loader"),
                    )
                })?;
            push_unique(&mut dependencies, dep);
            url_values.push(url);
        }

        let (kind, code, css) = match loaded.content {
            Content::Stylesheet(css) if loaded.extracted => {
                for request in &loaded.imports {
                    let target = self.cx.resolver.resolve(request, &dir)?;
                    let dep = self.visit(&target)?;
                    push_unique(&mut dependencies, dep);
                }
                let css = substitute_urls(&css, &url_values, false);
                (ModuleKind::Style, "/* extracted stylesheet */".to_string(), Some(css))
            }
            Content::Stylesheet(css) => {
                let mut code = String::new();
                for request in &loaded.imports {
                    code.push_str(&format!("require({});\n", js_string(request)));
                }
                code.push_str(&format!("module.exports = {};\n", js_string(&css)));
                let code = substitute_urls(&code, &url_values, true);
                (ModuleKind::Script, self.link_script(path, &dir, code, &mut dependencies)?, None)
            }
            Content::Script(code) => {
                let code = substitute_urls(&code, &url_values, true);
                let kind = match (&loaded.public_url, loaded.native) {
                    (Some(_), _) => ModuleKind::Asset,
                    (None, Some(NativeKind::Json)) => ModuleKind::Json,
                    _ => ModuleKind::Script,
                };
                (kind, self.link_script(path, &dir, code, &mut dependencies)?, None)
            }
            Content::Raw(_) => {
                return Err(Error::loader(
                    "rule",
                    path,
                    "the loader chain produced raw bytes; end it with a loader that produces a module",
                ));
            }
        };

        tracing::debug!(module = %id, ?kind, deps = dependencies.len(), "module built");
        self.visiting.remove(&id);
        self.graph.modules.insert(
            id.clone(),
            Module {
                id: id.clone(),
                path: path.to_path_buf(),
                kind,
                code,
                css,
                dependencies,
                public_url: loaded.public_url,
            },
        );
        Ok(id)
    }

    fn load(&self, path: &Path) -> Result<Loaded> {
        let context = self.cx.resolver.context();
        let bytes = fs::read(path)?;
        let mut ctx = LoaderContext::new(path, context, self.cx.public_path, self.cx.hash_length);

        let (content, extracted, native) = match self.cx.rules.dispatch(path)? {
            Dispatch::Rule(rule) => {
                tracing::trace!(file = %path.display(), rule = rule.index, "rule matched");
                let chain = rule.effective_chain(self.extracting);
                let content = run_chain(&chain, Content::Raw(bytes), &mut ctx)?;
                (content, rule.extract && self.extracting, None)
            }
            Dispatch::Native(NativeKind::Script) => {
                let source = String::from_utf8(bytes)
                    .map_err(|_| Error::loader("script", path, "file is not valid UTF-8"))?;
                (Content::Script(source), false, Some(NativeKind::Script))
            }
            Dispatch::Native(NativeKind::Json) => {
                let value: serde_json::Value = serde_json::from_slice(&bytes)
                    .map_err(|e| Error::loader("json", path, e.to_string()))?;
                let json = serde_json::to_string(&value)
                    .map_err(|e| Error::loader("json", path, e.to_string()))?;
                (
                    Content::Script(format!("module.exports = {json};\n")),
                    false,
                    Some(NativeKind::Json),
                )
            }
        };

        Ok(Loaded {
            content,
            extracted,
            native,
            urls: ctx.urls().to_vec(),
            imports: ctx.imports().to_vec(),
            public_url: ctx.public_url().map(str::to_string),
            emitted: ctx.into_emitted(),
        })
    }

    /// Lower, transform and link a script body.
    fn link_script(
        &mut self,
        path: &Path,
        dir: &Path,
        code: String,
        dependencies: &mut Vec<String>,
    ) -> Result<String> {
        let syntax = |e: crate::script::SyntaxError| Error::loader("script", path, e.message);
        let mut code = lower_esm(&code).map_err(syntax)?;
        for plugin in self.cx.plugins.iter() {
            code = plugin.transform_script(code);
        }

        let calls = find_requires(&code).map_err(syntax)?;
        let mut replacements = Vec::with_capacity(calls.len());
        for call in &calls {
            if self.cx.plugins.ignores(&call.request, dir) {
                tracing::debug!(request = %call.request, importer = %path.display(), "request ignored");
                replacements.push(format!("require.m({})", js_string(&call.request)));
                continue;
            }
            let target = self
                .cx
                .resolver
                .resolve(&call.request, dir)
                .map_err(|_| Error::ResolutionFailed {
                    request: call.request.clone(),
                    importer: module_id(self.cx.resolver.context(), path),
                })?;
            let dep = self.visit(&target)?;
            replacements.push(format!("require({})", js_string(&dep)));
            push_unique(dependencies, dep);
        }

        let mut replacements = replacements.into_iter();
        Ok(rewrite_requires(&code, &calls, |_| replacements.next()))
    }
}

fn push_unique(list: &mut Vec<String>, id: String) {
    if !list.contains(&id) {
        list.push(id);
    }
}

/// Replace url placeholders with final URLs, escaped for a JS string when
/// the text is script.
fn substitute_urls(text: &str, urls: &[String], in_script: bool) -> String {
    let mut out = text.to_string();
    for (index, url) in urls.iter().enumerate() {
        let value = if in_script {
            let quoted = js_string(url);
            quoted[1..quoted.len() - 1].to_string()
        } else {
            url.clone()
        };
        out = out.replace(&url_placeholder(index), &value);
    }
    out
}
