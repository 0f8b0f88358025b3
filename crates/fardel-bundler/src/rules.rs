//! Ordered rule table and first-match dispatch.

use std::path::{Path, PathBuf};

use fardel_config::{LoaderRef, Rule};
use path_clean::PathClean;
use regex::Regex;

use crate::loaders;
use crate::{Error, Result};

/// A rule with its regex compiled and its directories absolutized.
#[derive(Debug)]
pub struct CompiledRule {
    /// Position in the declared rule table
    pub index: usize,
    pub test: Regex,
    pub include: Vec<PathBuf>,
    pub exclude: Vec<PathBuf>,
    /// Loader chain, leftmost first; applied right to left
    pub chain: Vec<LoaderRef>,
    pub extract: bool,
    pub fallback: Option<LoaderRef>,
}

impl CompiledRule {
    /// Whether this rule's filters and pattern accept `path`.
    ///
    /// Exclusion is checked first and wins over both `include` and `test`.
    pub fn matches(&self, path: &Path) -> bool {
        if self.exclude.iter().any(|dir| path.starts_with(dir)) {
            return false;
        }
        if !self.include.is_empty() && !self.include.iter().any(|dir| path.starts_with(dir)) {
            return false;
        }
        self.test.is_match(&path.to_string_lossy().replace('\\', "/"))
    }

    /// The chain to run, given whether stylesheet extraction is active.
    pub fn effective_chain(&self, extracting: bool) -> Vec<LoaderRef> {
        match (&self.fallback, self.extract && !extracting) {
            (Some(fallback), true) => {
                let mut chain = Vec::with_capacity(self.chain.len() + 1);
                chain.push(fallback.clone());
                chain.extend(self.chain.iter().cloned());
                chain
            }
            _ => self.chain.clone(),
        }
    }

    fn same_treatment(&self, other: &CompiledRule) -> bool {
        self.chain == other.chain && self.extract == other.extract && self.fallback == other.fallback
    }
}

/// How a file without a loader chain is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeKind {
    Script,
    Json,
}

impl NativeKind {
    pub fn for_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("js" | "mjs" | "cjs" | "jsx") => Some(NativeKind::Script),
            Some("json") => Some(NativeKind::Json),
            _ => None,
        }
    }
}

/// The outcome of dispatching one file.
#[derive(Debug)]
pub enum Dispatch<'a> {
    Rule(&'a CompiledRule),
    Native(NativeKind),
}

/// A file matched by more than one rule with differing treatment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub path: PathBuf,
    /// Index of the rule that wins
    pub winner: usize,
    /// Later matching rules that are shadowed and would behave differently
    pub shadowed: Vec<usize>,
}

#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compile the declared rules against `context`.
    ///
    /// Fails on invalid patterns and on loader names that are not built in.
    pub fn compile(rules: &[Rule], context: &Path) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());

        for (index, rule) in rules.iter().enumerate() {
            let test = Regex::new(&rule.test).map_err(|e| {
                Error::InvalidConfig(format!("rules[{index}].test: {e}"))
            })?;

            let chain = rule.chain()?;
            let fallback = rule.fallback.as_ref().map(|f| f.resolve()).transpose()?;
            for loader in chain.iter().chain(fallback.iter()) {
                if loaders::builtin(&loader.name).is_none() {
                    return Err(Error::UnknownLoader {
                        name: loader.name.clone(),
                    });
                }
            }

            let absolutize = |dirs: &[PathBuf]| -> Vec<PathBuf> {
                dirs.iter().map(|d| context.join(d).clean()).collect()
            };

            compiled.push(CompiledRule {
                index,
                test,
                include: absolutize(&rule.include),
                exclude: absolutize(&rule.exclude),
                chain,
                extract: rule.extract,
                fallback,
            });
        }

        tracing::debug!(rules = compiled.len(), "compiled rule table");
        Ok(Self { rules: compiled })
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// The first rule matching `path`, if any.
    pub fn first_match(&self, path: &Path) -> Option<&CompiledRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// Decide how `path` is handled.
    ///
    /// The first matching rule wins; later rules are never consulted. A
    /// matching rule with an empty chain, or no match at all, falls back to
    /// native handling by extension.
    pub fn dispatch(&self, path: &Path) -> Result<Dispatch<'_>> {
        if let Some(rule) = self.first_match(path) {
            if !rule.chain.is_empty() {
                return Ok(Dispatch::Rule(rule));
            }
        }
        NativeKind::for_path(path)
            .map(Dispatch::Native)
            .ok_or_else(|| Error::NoMatchingRule {
                path: path.to_path_buf(),
            })
    }

    /// Files whose outcome depends on rule order.
    pub fn ambiguities<'p>(&self, paths: impl IntoIterator<Item = &'p Path>) -> Vec<Ambiguity> {
        let mut found = Vec::new();
        for path in paths {
            let mut matching = self.rules.iter().filter(|rule| rule.matches(path));
            let Some(winner) = matching.next() else {
                continue;
            };
            let shadowed: Vec<usize> = matching
                .filter(|rule| !rule.same_treatment(winner))
                .map(|rule| rule.index)
                .collect();
            if !shadowed.is_empty() {
                found.push(Ambiguity {
                    path: path.to_path_buf(),
                    winner: winner.index,
                    shadowed,
                });
            }
        }
        found
    }
}
