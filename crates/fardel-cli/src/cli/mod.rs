//! Command-line interface definition.
//!
//! - `fardel build` - run one build pass
//! - `fardel check` - validate the config and report rule-order ambiguities
//! - `fardel watch` - rebuild when sources change
//! - `fardel init` - write a starter config and sources

mod commands;

use clap::{Parser, ValueEnum};
use fardel_config::Mode;

pub use commands::{BuildArgs, CheckArgs, Command, InitArgs, ProjectArgs, WatchArgs};

/// fardel - a minimal build orchestrator for web assets
#[derive(Parser, Debug)]
#[command(
    name = "fardel",
    version,
    about = "A minimal build orchestrator for web assets",
    long_about = "fardel bundles named entry points through an ordered rule table and\n\
                  a fixed sequence of plugin steps into hashed, deterministic output files."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Build mode given on the command line
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum ModeArg {
    /// Minified output, `process.env.NODE_ENV` set to "production"
    #[value(name = "production", alias = "prod")]
    Production,

    /// Readable output, `process.env.NODE_ENV` set to "development"
    #[value(name = "development", alias = "dev")]
    Development,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Production => Mode::Production,
            ModeArg::Development => Mode::Development,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::PathBuf;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn build_accepts_project_flags() {
        let cli = Cli::parse_from([
            "fardel",
            "build",
            "--cwd",
            "app",
            "--config",
            "fardel.prod.toml",
            "--mode",
            "dev",
            "--profile",
            "staging",
        ]);
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.project.cwd, Some(PathBuf::from("app")));
        assert_eq!(args.project.config, Some(PathBuf::from("fardel.prod.toml")));
        assert_eq!(args.project.mode, Some(ModeArg::Development));
        assert_eq!(args.project.profile.as_deref(), Some("staging"));
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = Cli::parse_from(["fardel", "check", "--quiet", "--no-color"]);
        assert!(cli.quiet && cli.no_color);
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["fardel", "-v", "-q", "build"]).is_err());
    }

    #[test]
    fn watch_debounce_defaults() {
        let cli = Cli::parse_from(["fardel", "watch"]);
        let Command::Watch(args) = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(args.debounce, 200);
    }

    #[test]
    fn overrides_carry_mode_and_output() {
        let cli = Cli::parse_from(["fardel", "build", "--mode", "production", "--out-dir", "dist"]);
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.mode, Some(Mode::Production));
        assert_eq!(overrides.output_path, Some(PathBuf::from("dist")));
        assert_eq!(overrides.profile, None);
    }
}
