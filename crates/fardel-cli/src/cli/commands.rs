use std::path::PathBuf;

use clap::{Args, Subcommand};
use fardel_config::ConfigOverrides;

use crate::cli::ModeArg;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one build pass
    ///
    /// Resolves every entry, runs the rule table and plugin steps and writes
    /// hashed output files atomically.
    Build(BuildArgs),

    /// Validate configuration without building
    ///
    /// Checks the config schema and that entries, include directories and
    /// templates exist, then lists project files whose treatment depends on
    /// rule order.
    Check(CheckArgs),

    /// Rebuild whenever project files change
    Watch(WatchArgs),

    /// Write a starter fardel.toml and sources
    Init(InitArgs),
}

impl Command {
    /// Project location flags, for commands that read a config.
    pub fn project(&self) -> Option<&ProjectArgs> {
        match self {
            Command::Build(args) => Some(&args.project),
            Command::Check(args) => Some(&args.project),
            Command::Watch(args) => Some(&args.build.project),
            Command::Init(_) => None,
        }
    }
}

/// Where the project lives and which configuration to apply
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project directory (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Config file, relative to the project directory
    ///
    /// Without it fardel.toml, fardel.json and the "fardel" field of
    /// package.json are tried in that order.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Build mode (overrides `mode` in the config and FARDEL_MODE)
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Profile to merge over the base config (defaults to the mode name)
    #[arg(short, long, value_name = "NAME")]
    pub profile: Option<String>,
}

impl ProjectArgs {
    /// Scalar overrides taken from these flags.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            mode: self.mode.map(Into::into),
            profile: self.profile.clone(),
            ..ConfigOverrides::default()
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output directory (overrides `output.path`)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

impl BuildArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            output_path: self.out_dir.clone(),
            ..self.project.overrides()
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Fail when a file's treatment depends on rule order
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Quiet period after the last change before rebuilding, in milliseconds
    #[arg(long, default_value_t = 200, value_name = "MS")]
    pub debounce: u64,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Overwrite existing files
    #[arg(short, long)]
    pub force: bool,

    /// Only write fardel.toml, no starter sources
    #[arg(long)]
    pub bare: bool,
}
