use std::path::Path;

use fardel_config::IgnoreOptions;
use regex::Regex;

use super::{Plugin, PluginPhase};
use crate::{Error, Result};

/// Drops requests matching `resource`, optionally only from importers whose
/// directory matches `context`.
///
/// A dropped request compiles to a call that throws `MODULE_NOT_FOUND`, so
/// guarded optional requires keep working.
pub struct IgnorePlugin {
    resource: Regex,
    context: Option<Regex>,
}

impl IgnorePlugin {
    pub fn new(options: &IgnoreOptions) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| Error::plugin("ignore", format!("invalid pattern '{pattern}': {e}")))
        };
        Ok(Self {
            resource: compile(&options.resource)?,
            context: options.context.as_deref().map(compile).transpose()?,
        })
    }
}

impl Plugin for IgnorePlugin {
    fn name(&self) -> &'static str {
        "ignore"
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Resolve
    }

    fn ignores(&self, request: &str, importer_dir: &Path) -> bool {
        if !self.resource.is_match(request) {
            return false;
        }
        match &self.context {
            Some(context) => context.is_match(&importer_dir.to_string_lossy().replace('\\', "/")),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ignore(resource: &str, context: Option<&str>) -> IgnorePlugin {
        IgnorePlugin::new(&IgnoreOptions {
            resource: resource.to_string(),
            context: context.map(str::to_string),
        })
        .unwrap()
    }

    #[test]
    fn matches_resource() {
        let plugin = ignore(r"^\./locale$", None);
        assert!(plugin.ignores("./locale", Path::new("/repo/node_modules/moment")));
        assert!(!plugin.ignores("./locales", Path::new("/repo")));
    }

    #[test]
    fn context_restricts_importers() {
        let plugin = ignore(r"^\./locale$", Some("moment$"));
        assert!(plugin.ignores("./locale", Path::new("/repo/node_modules/moment")));
        assert!(!plugin.ignores("./locale", Path::new("/repo/src")));
    }

    #[test]
    fn bad_pattern_is_an_error() {
        assert!(IgnorePlugin::new(&IgnoreOptions {
            resource: "(".to_string(),
            context: None,
        })
        .is_err());
    }
}
