//! Error handling for the CLI.
//!
//! Library errors convert into [`CliError`] through `#[from]`;
//! [`cli_error_to_miette`] turns the final error into a report with a hint.

use std::path::PathBuf;

use fardel_config::ConfigError;
use miette::Report;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Config file missing, unparsable or invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Any failure inside a build pass
    #[error(transparent)]
    Build(#[from] fardel_bundler::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// `init` would overwrite an existing file
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// `check --strict` found problems
    #[error("Check failed: {0}")]
    CheckFailed(String),

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

impl CliError {
    /// Actionable advice shown under the error.
    pub fn hint(&self) -> Option<String> {
        match self {
            CliError::Config(ConfigError::NotFound) => Some(
                "Create a fardel.toml (try `fardel init`) or pass --config <path>".to_string(),
            ),
            CliError::Config(ConfigError::EntryNotFound { .. }) => {
                Some("Entry paths are relative to the config file's directory".to_string())
            }
            CliError::Config(ConfigError::NoEntries) => {
                Some("Declare at least one entry under [entries]".to_string())
            }
            CliError::Config(ConfigError::UnsupportedFormat(_)) => {
                Some("Use fardel.toml, fardel.json or a \"fardel\" field in package.json".to_string())
            }
            CliError::AlreadyExists(_) => Some("Pass --force to overwrite it".to_string()),
            CliError::CheckFailed(_) => {
                Some("Reorder the rules or narrow their `test`, `include` and `exclude`".to_string())
            }
            CliError::FileNotFound(_) => Some("Check the --cwd and --config paths".to_string()),
            _ => None,
        }
    }
}

/// Convert a CLI error to a miette report.
///
/// Bundler errors carry their own diagnostic code and help text.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => Report::new(e),
        other => match other.hint() {
            Some(hint) => miette::miette!(help = hint, "{}", other),
            None => miette::miette!("{}", other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_suggests_init() {
        let err = CliError::from(ConfigError::NotFound);
        assert!(err.to_string().contains("config not found"));
        assert!(err.hint().unwrap().contains("fardel init"));
    }

    #[test]
    fn bundler_errors_keep_their_diagnostic() {
        let err = CliError::from(fardel_bundler::Error::NoMatchingRule {
            path: PathBuf::from("src/logo.webp"),
        });
        let report = cli_error_to_miette(err);
        let code = report.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("NO_MATCHING_RULE"));
        assert!(report.help().is_some());
    }

    #[test]
    fn hints_become_report_help() {
        let report = cli_error_to_miette(CliError::AlreadyExists(PathBuf::from("fardel.toml")));
        assert_eq!(
            report.help().map(|h| h.to_string()).as_deref(),
            Some("Pass --force to overwrite it")
        );
        assert!(report.to_string().contains("fardel.toml already exists"));
    }

    #[test]
    fn io_errors_convert() {
        let err: CliError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, CliError::Io(_)));
        assert!(err.hint().is_none());
    }
}
