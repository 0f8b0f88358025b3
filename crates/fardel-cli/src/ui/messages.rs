//! Status message functions for terminal output.

use owo_colors::OwoColorize;

use super::{colors_enabled, is_quiet};

pub fn success(message: &str) {
    if is_quiet() {
        return;
    }
    if colors_enabled() {
        eprintln!("{} {}", "✓".green().bold(), message);
    } else {
        eprintln!("✓ {message}");
    }
}

pub fn info(message: &str) {
    if is_quiet() {
        return;
    }
    if colors_enabled() {
        eprintln!("{} {}", "ℹ".blue().bold(), message);
    } else {
        eprintln!("ℹ {message}");
    }
}

pub fn warning(message: &str) {
    if is_quiet() {
        return;
    }
    if colors_enabled() {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    } else {
        eprintln!("⚠ {message}");
    }
}

/// Printed even in quiet mode.
pub fn error(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    } else {
        eprintln!("✗ {message}");
    }
}
