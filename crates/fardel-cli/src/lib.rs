//! Command-line interface for the fardel build orchestrator.
//!
//! - [`cli`] - argument definitions (clap derive)
//! - [`commands`] - `build`, `check`, `watch` and `init`
//! - [`error`] - [`CliError`] and its conversion to miette reports
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines and the build summary table

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
