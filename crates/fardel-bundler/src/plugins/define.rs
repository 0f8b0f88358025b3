use fardel_config::DefineOptions;
use oxc::allocator::Allocator;
use oxc::ast::ast::{Expression, ObjectProperty};
use oxc::ast_visit::{walk, Visit};
use oxc::span::GetSpan;

use super::{Plugin, PluginPhase};
use crate::script::{parse, range, Edits};
use crate::{Error, Result};

/// Replaces free occurrences of configured expressions with source text.
///
/// `process.env.NODE_ENV` matches `process.env.NODE_ENV` and the object of
/// `process.env.NODE_ENV.length`, but not `foo.process.env.NODE_ENV`, not
/// text inside strings or comments, and not an assignment target.
pub struct DefinePlugin {
    definitions: Vec<(String, String)>,
}

impl DefinePlugin {
    pub fn new(options: &DefineOptions) -> Result<Self> {
        let mut definitions = Vec::new();
        for (key, value) in options.flatten() {
            if !is_member_chain(&key) {
                return Err(Error::plugin(
                    "define",
                    format!("'{key}' is not an identifier or member expression"),
                ));
            }
            definitions.push((key, value));
        }
        Ok(Self { definitions })
    }

    fn lookup(&self, chain: &str) -> Option<&str> {
        self.definitions
            .iter()
            .find(|(key, _)| key == chain)
            .map(|(_, value)| value.as_str())
    }
}

fn is_member_chain(key: &str) -> bool {
    key.split('.').all(|part| {
        let mut chars = part.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    })
}

/// `a.b.c` for an identifier or a chain of static member accesses.
fn chain_of(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::Identifier(id) => Some(id.name.to_string()),
        Expression::StaticMemberExpression(member) if !member.optional => {
            let mut chain = chain_of(&member.object)?;
            chain.push('.');
            chain.push_str(&member.property.name);
            Some(chain)
        }
        _ => None,
    }
}

struct Replacer<'p> {
    plugin: &'p DefinePlugin,
    edits: Edits,
}

impl<'a> Visit<'a> for Replacer<'_> {
    // Outer chains are seen before their objects, so `a.b.c` wins over `a.b`.
    fn visit_expression(&mut self, it: &Expression<'a>) {
        if let Some(value) = chain_of(it).and_then(|chain| self.plugin.lookup(&chain)) {
            self.edits.add(range(it.span()), value.to_string());
            return;
        }
        walk::walk_expression(self, it);
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        if it.shorthand
            && let Expression::Identifier(id) = &it.value
            && let Some(value) = self.plugin.lookup(&id.name)
        {
            self.edits.add(range(it.span), format!("{}: {value}", id.name));
            return;
        }
        walk::walk_object_property(self, it);
    }
}

impl Plugin for DefinePlugin {
    fn name(&self) -> &'static str {
        "define"
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Transform
    }

    fn transform_script(&self, code: String) -> String {
        if self.definitions.is_empty() {
            return code;
        }
        let allocator = Allocator::default();
        let program = match parse(&allocator, &code) {
            Ok(program) => program,
            Err(e) => {
                tracing::debug!(error = %e, "script did not parse, skipping define");
                return code;
            }
        };
        let mut replacer = Replacer {
            plugin: self,
            edits: Edits::default(),
        };
        replacer.visit_program(&program);
        if replacer.edits.is_empty() {
            return code;
        }
        replacer.edits.apply(&code)
    }
}
