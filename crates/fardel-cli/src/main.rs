//! fardel CLI entry point: parse arguments, set up logging, dispatch.

use clap::Parser;
use fardel_cli::{cli, commands, error, logger, ui};
use miette::Result;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let settings = commands::peek_settings(args.command.project());
    logger::init_logger(&logger::LogOptions {
        verbose: args.verbose,
        quiet: args.quiet,
        no_color: args.no_color,
        level: settings.log_level,
        format: settings.log_format,
    });
    ui::init_colors(args.no_color);
    ui::set_quiet(args.quiet);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args),
        cli::Command::Check(check_args) => commands::check_execute(check_args),
        cli::Command::Watch(watch_args) => commands::watch_execute(watch_args),
        cli::Command::Init(init_args) => commands::init_execute(init_args),
    };

    result.map_err(error::cli_error_to_miette)
}
