//! Terminal output: status lines and the build summary.
//!
//! Everything goes to stderr so stdout stays free for piping.

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, format_size, print_build_summary, render_build_summary};
pub use messages::{error, info, success, warning};

static COLOR: AtomicBool = AtomicBool::new(true);
static QUIET: AtomicBool = AtomicBool::new(false);

/// Whether color output should be used, given the environment.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` enables them even without a
/// terminal; otherwise stderr must be attended.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Set up color support. Call once, early in `main`.
pub fn init_colors(no_color: bool) {
    COLOR.store(!no_color && should_use_color(), Ordering::Relaxed);
}

/// Suppress everything but errors.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLOR.load(Ordering::Relaxed)
}

pub(crate) fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn no_color_env_disables_colors() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_color());
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    #[serial]
    fn force_color_enables_colors() {
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(should_use_color());
        unsafe { std::env::remove_var("FORCE_COLOR") };
    }

    #[test]
    #[serial]
    fn flag_wins_over_environment() {
        unsafe { std::env::set_var("FORCE_COLOR", "1") };
        init_colors(true);
        assert!(!colors_enabled());
        unsafe { std::env::remove_var("FORCE_COLOR") };
    }
}
