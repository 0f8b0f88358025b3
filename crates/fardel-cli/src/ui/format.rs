//! Formatting utilities for sizes, durations, and build summaries.

use std::time::Duration;

use console::{measure_text_width, pad_str, truncate_str, Alignment, Term};
use fardel_bundler::{AssetKind, BuildResult};
use owo_colors::OwoColorize;

use super::{colors_enabled, is_quiet};

/// Human-readable size: `0 B`, `500 B`, `1.50 KB`, `2.00 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;
    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Human-readable duration: `50ms`, `1.50s`, `2m 5s`.
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn kind_label(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Script => "script",
        AssetKind::Stylesheet => "style",
        AssetKind::Page => "page",
        AssetKind::Media => "media",
        AssetKind::Compressed => "compressed",
        AssetKind::Report => "report",
    }
}

/// Lay out the asset table for a terminal `width` columns wide.
pub fn render_build_summary(result: &BuildResult, width: usize, color: bool) -> String {
    let width = width.clamp(40, 100);
    let size_col = 12;
    let kind_col = 11;
    let chunk_col = result
        .assets
        .iter()
        .filter_map(|a| a.chunk.as_deref())
        .map(measure_text_width)
        .max()
        .unwrap_or(0)
        .min(16);
    let name_col = width.saturating_sub(size_col + kind_col + chunk_col + 8).max(12);

    let rule = "─".repeat(width);
    let mut out = String::new();

    let title = "Build Summary";
    if color {
        out.push_str(&format!("\n{}\n", title.bold().underline()));
    } else {
        out.push_str(&format!("\n{title}\n"));
    }
    out.push_str(&rule);
    out.push('\n');

    for asset in &result.assets {
        let name = truncate_str(&asset.filename, name_col, "…");
        let name = pad_str(&name, name_col, Alignment::Left, None);
        let kind = pad_str(kind_label(asset.kind), kind_col, Alignment::Left, None);
        let chunk = pad_str(asset.chunk.as_deref().unwrap_or(""), chunk_col, Alignment::Left, None);
        let size_str = format_size(asset.size as u64);
        let size = pad_str(&size_str, size_col, Alignment::Right, None);

        if color {
            out.push_str(&format!(
                "  {} {} {} {} {}\n",
                "▸".blue(),
                name.bright_white().bold(),
                kind.dimmed(),
                chunk.cyan(),
                size.dimmed()
            ));
        } else {
            out.push_str(&format!("  ▸ {name} {kind} {chunk} {size}\n"));
        }
    }

    out.push_str(&rule);
    out.push('\n');

    let total = format_size(result.total_size() as u64);
    let elapsed = format_duration(result.duration);
    let files = result.assets.len();
    if color {
        out.push_str(&format!(
            "  {} {} in {} files, {} (hash {})\n",
            "Total:".bold(),
            total.green(),
            files,
            elapsed.green(),
            result.hash.dimmed()
        ));
    } else {
        out.push_str(&format!(
            "  Total: {total} in {files} files, {elapsed} (hash {})\n",
            result.hash
        ));
    }
    out
}

/// Print the asset table for a finished build to stderr.
pub fn print_build_summary(result: &BuildResult) {
    if is_quiet() {
        return;
    }
    let width = Term::stderr().size().1 as usize;
    eprint!("{}", render_build_summary(result, width, colors_enabled()));
}
