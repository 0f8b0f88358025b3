//! Script module rewriting.
//!
//! Sources are parsed with oxc. ES module declarations are lowered to the
//! CommonJS shape the runtime executes, and `require("...")` calls are
//! located on the AST so their requests can be resolved and rewritten to
//! module ids. All rewriting is done by span over the original text.

use std::ops::Range;

use oxc::allocator::Allocator;
use oxc::ast::ast::{
    CallExpression, Declaration, ExportAllDeclaration, ExportDefaultDeclaration,
    ExportDefaultDeclarationKind, ExportNamedDeclaration, Expression, ImportDeclaration,
    ImportDeclarationSpecifier, ImportExpression, Program, Statement, Argument,
};
use oxc::ast_visit::{walk, Visit};
use oxc::parser::{ParseOptions, Parser};
use oxc::span::{GetSpan, SourceType, Span};

/// A script that oxc could not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
}

/// Parse `src` as a module when it uses module syntax, as a CommonJS body
/// otherwise.
pub(crate) fn parse<'a>(
    allocator: &'a Allocator,
    src: &'a str,
) -> std::result::Result<Program<'a>, SyntaxError> {
    let ret = Parser::new(allocator, src, SourceType::unambiguous())
        .with_options(ParseOptions {
            allow_return_outside_function: true,
            ..ParseOptions::default()
        })
        .parse();
    if let Some(first) = ret.errors.first() {
        let message = match ret.errors.len() {
            1 => first.to_string(),
            n => format!("{first} (and {} more)", n - 1),
        };
        return Err(SyntaxError { message });
    }
    Ok(ret.program)
}

pub(crate) fn range(span: Span) -> Range<usize> {
    span.start as usize..span.end as usize
}

/// Escape text as a double-quoted JavaScript string literal.
pub fn js_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// `object.name`, or `object["name"]` when `name` is not an identifier.
fn member(object: &str, name: &str) -> String {
    if is_identifier(name) {
        format!("{object}.{name}")
    } else {
        format!("{object}[{}]", js_string(name))
    }
}

/// Non-overlapping replacements over one source text.
#[derive(Default)]
pub(crate) struct Edits {
    edits: Vec<(Range<usize>, String)>,
}

impl Edits {
    pub(crate) fn add(&mut self, range: Range<usize>, text: String) -> bool {
        if self
            .edits
            .iter()
            .any(|(r, _)| r.start < range.end && range.start < r.end)
        {
            return false;
        }
        self.edits.push((range, text));
        true
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub(crate) fn apply(mut self, src: &str) -> String {
        self.edits.sort_by_key(|(r, _)| (r.start, r.end));
        let mut out = String::with_capacity(src.len());
        let mut last = 0;
        for (range, text) in self.edits {
            out.push_str(&src[last..range.start]);
            out.push_str(&text);
            last = range.end;
        }
        out.push_str(&src[last..]);
        out
    }
}

#[derive(Default)]
struct Lowering {
    edits: Edits,
    /// Assignments placed before the body; function exports are hoisted
    hoisted: Vec<String>,
    trailing: Vec<String>,
    counter: usize,
    is_module: bool,
}

impl Lowering {
    fn binding(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("__fardel_{prefix}_{}__", self.counter)
    }

    fn import(&mut self, decl: &ImportDeclaration<'_>) {
        let require = format!("require({})", js_string(&decl.source.value));
        let text = match &decl.specifiers {
            None => format!("{require};"),
            Some(specifiers) => {
                let binding = self.binding("import");
                let mut text = format!("var {binding} = require.i({require});");
                for specifier in specifiers {
                    let (local, value) = match specifier {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            (s.local.name.as_str(), member(&binding, &s.imported.name()))
                        }
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            (s.local.name.as_str(), member(&binding, "default"))
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            (s.local.name.as_str(), binding.clone())
                        }
                    };
                    text.push_str(&format!(" var {local} = {value};"));
                }
                text
            }
        };
        self.edits.add(range(decl.span), text);
    }

    fn export_all(&mut self, decl: &ExportAllDeclaration<'_>) {
        let require = format!("require({})", js_string(&decl.source.value));
        let text = match &decl.exported {
            None => format!("require.r(exports, {require});"),
            Some(name) => format!("{} = require.i({require});", member("exports", &name.name())),
        };
        self.edits.add(range(decl.span), text);
    }

    fn export_named(&mut self, decl: &ExportNamedDeclaration<'_>) {
        if let Some(source) = &decl.source {
            let binding = self.binding("reexport");
            let mut text = format!("var {binding} = require.i(require({}));", js_string(&source.value));
            for specifier in &decl.specifiers {
                text.push_str(&format!(
                    " {} = {};",
                    member("exports", &specifier.exported.name()),
                    member(&binding, &specifier.local.name())
                ));
            }
            self.edits.add(range(decl.span), text);
            return;
        }

        let Some(declaration) = &decl.declaration else {
            if self.edits.add(range(decl.span), String::new()) {
                for specifier in &decl.specifiers {
                    self.trailing.push(format!(
                        "{} = {};",
                        member("exports", &specifier.exported.name()),
                        specifier.local.name()
                    ));
                }
            }
            return;
        };

        if !self
            .edits
            .add(decl.span.start as usize..declaration.span().start as usize, String::new())
        {
            return;
        }
        match declaration {
            Declaration::VariableDeclaration(var) => {
                for declarator in &var.declarations {
                    for id in declarator.id.get_binding_identifiers() {
                        let name = id.name.as_str();
                        self.trailing.push(format!("exports.{name} = {name};"));
                    }
                }
            }
            Declaration::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    let name = id.name.as_str();
                    self.hoisted.push(format!("exports.{name} = {name};"));
                }
            }
            Declaration::ClassDeclaration(class) => {
                if let Some(id) = &class.id {
                    let name = id.name.as_str();
                    self.trailing.push(format!("exports.{name} = {name};"));
                }
            }
            _ => {}
        }
    }

    fn export_default(&mut self, decl: &ExportDefaultDeclaration<'_>) {
        let prefix = decl.span.start as usize..decl.declaration.span().start as usize;
        match &decl.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => match &func.id {
                Some(id) => {
                    self.edits.add(prefix, String::new());
                    self.hoisted.push(format!("exports.default = {};", id.name));
                }
                None => self.default_expression(prefix, func.span.end),
            },
            ExportDefaultDeclarationKind::ClassDeclaration(class) => match &class.id {
                Some(id) => {
                    self.edits.add(prefix, String::new());
                    self.trailing.push(format!("exports.default = {};", id.name));
                }
                None => self.default_expression(prefix, class.span.end),
            },
            ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => {
                self.edits.add(range(decl.span), String::new());
            }
            _ => {
                self.edits.add(prefix, "exports.default = ".to_string());
            }
        }
    }

    /// An anonymous function or class declaration becomes an assigned
    /// expression; the statement needs its own terminator.
    fn default_expression(&mut self, prefix: Range<usize>, end: u32) {
        self.edits.add(prefix, "exports.default = ".to_string());
        self.edits.add(end as usize..end as usize, ";".to_string());
    }
}

impl<'a> Visit<'a> for Lowering {
    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        if let Expression::StringLiteral(source) = &it.source {
            let text = format!(
                "Promise.resolve().then(function () {{ return require.i(require({})); }})",
                js_string(&source.value)
            );
            self.edits.add(range(it.span), text);
            return;
        }
        walk::walk_import_expression(self, it);
    }
}

/// Lower `import`/`export` syntax and dynamic `import("...")` to CommonJS.
///
/// Returns the source unchanged when it has nothing to lower.
pub fn lower_esm(src: &str) -> std::result::Result<String, SyntaxError> {
    let allocator = Allocator::default();
    let program = parse(&allocator, src)?;

    let mut lowering = Lowering::default();
    for statement in &program.body {
        match statement {
            Statement::ImportDeclaration(decl) => lowering.import(decl),
            Statement::ExportAllDeclaration(decl) => lowering.export_all(decl),
            Statement::ExportNamedDeclaration(decl) => lowering.export_named(decl),
            Statement::ExportDefaultDeclaration(decl) => lowering.export_default(decl),
            _ => continue,
        }
        lowering.is_module = true;
    }
    lowering.visit_program(&program);

    let Lowering {
        edits,
        hoisted,
        trailing,
        is_module,
        ..
    } = lowering;
    if edits.is_empty() && hoisted.is_empty() && trailing.is_empty() {
        return Ok(src.to_string());
    }

    let mut out = String::new();
    if is_module {
        out.push_str("Object.defineProperty(exports, \"__esModule\", { value: true });\n");
    }
    for line in &hoisted {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&edits.apply(src));
    if !trailing.is_empty() {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&trailing.join("\n"));
        out.push('\n');
    }
    Ok(out)
}

/// A `require("...")` call with a literal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireCall {
    /// The whole call expression
    pub call: Range<usize>,
    /// The string literal, quotes included
    pub literal: Range<usize>,
    pub request: String,
}

#[derive(Default)]
struct RequireCollector {
    calls: Vec<RequireCall>,
}

impl<'a> Visit<'a> for RequireCollector {
    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if it.callee.is_specific_id("require")
            && it.arguments.len() == 1
            && let Argument::StringLiteral(literal) = &it.arguments[0]
        {
            self.calls.push(RequireCall {
                call: range(it.span),
                literal: range(literal.span),
                request: literal.value.to_string(),
            });
        }
        walk::walk_call_expression(self, it);
    }
}

/// Locate every `require("...")` call in source order.
pub fn find_requires(src: &str) -> std::result::Result<Vec<RequireCall>, SyntaxError> {
    let allocator = Allocator::default();
    let program = parse(&allocator, src)?;
    let mut collector = RequireCollector::default();
    collector.visit_program(&program);
    let mut calls = collector.calls;
    calls.sort_by_key(|call| call.call.start);
    Ok(calls)
}

/// Rewrite every located require call.
///
/// `rewrite` returns the replacement for the whole call expression, or
/// `None` to leave it untouched. Calls nested in another call's arguments
/// are left as they are.
pub fn rewrite_requires(
    src: &str,
    calls: &[RequireCall],
    mut rewrite: impl FnMut(&RequireCall) -> Option<String>,
) -> String {
    let mut edits = Edits::default();
    for call in calls {
        if let Some(text) = rewrite(call) {
            edits.add(call.call.clone(), text);
        }
    }
    edits.apply(src)
}
