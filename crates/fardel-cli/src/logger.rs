//! Logging setup for the CLI.
//!
//! Library crates emit `tracing` events; this module installs the subscriber
//! that prints them to stderr.
//!
//! The filter is chosen in this order:
//! 1. `--verbose`: debug for the fardel crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. `settings.log_level` from the config file
//! 5. info for the fardel crates

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "fardel=debug,fardel_bundler=debug,fardel_config=debug,fardel_cli=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "fardel=info,fardel_bundler=info,fardel_config=info,fardel_cli=info";

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub verbose: bool,
    pub quiet: bool,
    pub no_color: bool,
    /// Filter directive used when no flag or `RUST_LOG` applies
    pub level: Option<String>,
    /// `compact` (default) or `full`
    pub format: Option<String>,
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logger(options: &LogOptions) {
    let filter = build_filter(options);
    let full = options.format.as_deref() == Some("full");
    let ansi = !options.no_color && should_use_colors();

    let compact_layer = (!full).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .with_ansi(ansi)
            .compact()
    });
    let full_layer = full.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_ansi(ansi)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(compact_layer)
        .with(full_layer)
        .try_init();
}

fn build_filter(options: &LogOptions) -> EnvFilter {
    if options.verbose {
        return EnvFilter::new(VERBOSE_FILTER);
    }
    if options.quiet {
        return EnvFilter::new(QUIET_FILTER);
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    options
        .level
        .as_deref()
        .and_then(|level| EnvFilter::try_new(level_directive(level)).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// A bare level (`debug`) applies to the fardel crates only; anything else
/// is taken as a full filter directive.
fn level_directive(level: &str) -> String {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => {
            format!("fardel={level},fardel_bundler={level},fardel_config={level},fardel_cli={level}")
        }
        other => other.to_string(),
    }
}

/// Whether stderr should get ANSI colors.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise the terminal decides.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn bare_levels_target_fardel_crates() {
        assert_eq!(
            level_directive("warn"),
            "fardel=warn,fardel_bundler=warn,fardel_config=warn,fardel_cli=warn"
        );
        assert_eq!(level_directive("fardel_bundler=trace"), "fardel_bundler=trace");
    }

    #[test]
    fn verbose_wins_over_configured_level() {
        let options = LogOptions {
            verbose: true,
            level: Some("error".into()),
            ..LogOptions::default()
        };
        assert!(build_filter(&options).to_string().contains("fardel_bundler=debug"));
    }

    #[test]
    #[serial]
    fn configured_level_is_used_without_rust_log() {
        unsafe { std::env::remove_var("RUST_LOG") };
        let options = LogOptions {
            level: Some("warn".into()),
            ..LogOptions::default()
        };
        assert!(build_filter(&options).to_string().contains("fardel_cli=warn"));
    }

    #[test]
    #[serial]
    fn no_color_overrides_force_color() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_colors());
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::remove_var("FORCE_COLOR");
        }
    }
}
