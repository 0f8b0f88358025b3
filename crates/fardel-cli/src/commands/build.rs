//! `fardel build`: one build pass with a summary.

use fardel_bundler::{BuildResult, Bundler};

use crate::cli::BuildArgs;
use crate::commands::utils::{self, Project};
use crate::error::Result;
use crate::ui;

/// Execute the build command.
///
/// 1. Load the config (defaults < file < `FARDEL_*` env < flags, then profile)
/// 2. Validate it and compile rules and plugins
/// 3. Run the pass and print the asset table
pub fn execute(args: BuildArgs) -> Result<()> {
    let project = utils::load_project(&args.project, args.overrides())?;
    let result = run(project)?;
    report(&result);
    Ok(())
}

/// Build a loaded project.
pub(crate) fn run(project: Project) -> Result<BuildResult> {
    let Project { context, config, .. } = project;
    ui::info(&format!(
        "Building {} {} in {} mode",
        config.entries.len(),
        if config.entries.len() == 1 { "entry" } else { "entries" },
        config.mode
    ));

    let bundler = Bundler::with_context(config, &context)?;
    Ok(bundler.build()?)
}

pub(crate) fn report(result: &BuildResult) {
    for warning in &result.warnings {
        ui::warning(warning);
    }
    ui::print_build_summary(result);
    ui::success(&format!(
        "Built {} files into {} in {}",
        result.assets.len(),
        result.output_dir.display(),
        ui::format_duration(result.duration)
    ));
}
