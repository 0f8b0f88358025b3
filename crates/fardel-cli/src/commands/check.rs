//! `fardel check`: validate the config without building.

use std::path::{Path, PathBuf};

use fardel_bundler::{Ambiguity, Bundler};
use fardel_config::validate_fs;
use walkdir::WalkDir;

use crate::cli::CheckArgs;
use crate::commands::utils::{self, Project};
use crate::error::{CliError, Result};
use crate::ui;

/// What a check found.
#[derive(Debug)]
pub struct CheckReport {
    /// Plugin steps in execution order, implicit ones included
    pub plugins: Vec<&'static str>,
    /// Project files the rule table was tested against
    pub files: usize,
    pub ambiguities: Vec<Ambiguity>,
}

/// Execute the check command.
///
/// 1. Schema validation, rule compilation and plugin setup
/// 2. Entries, rule include directories and html templates exist
/// 3. Project files whose treatment depends on rule order are listed;
///    with `--strict` they fail the check
pub fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");
    let project = utils::load_project(&args.project, args.project.overrides())?;
    let context = project.context.clone();
    let report = check(project)?;

    ui::success("Configuration is valid");
    ui::info(&format!("Plugin steps: {}", report.plugins.join(" → ")));

    for ambiguity in &report.ambiguities {
        let path = ambiguity.path.strip_prefix(&context).unwrap_or(&ambiguity.path);
        let shadowed: Vec<String> = ambiguity
            .shadowed
            .iter()
            .map(|index| format!("rules[{index}]"))
            .collect();
        ui::warning(&format!(
            "{}: rules[{}] wins over {}",
            path.display(),
            ambiguity.winner,
            shadowed.join(", ")
        ));
    }

    if !report.ambiguities.is_empty() {
        let message = format!(
            "{} of {} files depend on rule order",
            report.ambiguities.len(),
            report.files
        );
        if args.strict {
            return Err(CliError::CheckFailed(message));
        }
        ui::warning(&message);
    }

    ui::success("All checks passed");
    Ok(())
}

/// Validate `project` and test its rule table against the project files.
pub fn check(project: Project) -> Result<CheckReport> {
    let Project { context, config, .. } = project;
    let bundler = Bundler::with_context(config, &context)?;
    validate_fs(bundler.config(), bundler.context())?;

    let files = project_files(bundler.context(), &bundler.output_dir());
    let ambiguities = bundler
        .rules()
        .ambiguities(files.iter().map(PathBuf::as_path));

    Ok(CheckReport {
        plugins: bundler.plugins().names(),
        files: files.len(),
        ambiguities,
    })
}

/// Files under `context`, skipping the output directory, `node_modules`
/// and hidden entries.
pub(crate) fn project_files(context: &Path, output_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(context)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !name.starts_with('.') && name != "node_modules" && entry.path() != output_dir
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}
