//! `fardel watch`: rebuild when project files change.
//!
//! Builds run one at a time on this thread. Changes that arrive during a
//! build are picked up by the next one.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher};

use crate::cli::{BuildArgs, WatchArgs};
use crate::commands::{build, utils};
use crate::error::{cli_error_to_miette, Result};
use crate::ui;

/// Decides which paths trigger a rebuild.
#[derive(Debug, Clone)]
pub struct WatchFilter {
    root: PathBuf,
    ignored: Vec<PathBuf>,
}

impl WatchFilter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignored: Vec::new(),
        }
    }

    /// Stop reacting to changes under `dir` (the output directory).
    pub fn ignore(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !self.ignored.contains(&dir) {
            self.ignored.push(dir);
        }
    }

    pub fn is_relevant(&self, path: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(&self.root) else {
            return false;
        };
        if self.ignored.iter().any(|dir| path.starts_with(dir)) {
            return false;
        }
        if path.extension().is_some_and(|ext| ext == "tmp") {
            return false;
        }
        !rel.components().any(|c| {
            let name = c.as_os_str().to_string_lossy();
            name.starts_with('.') || name == "node_modules"
        })
    }
}

/// Execute the watch command. Runs until interrupted.
pub fn execute(args: WatchArgs) -> Result<()> {
    let root = utils::project_root(args.build.project.cwd.as_deref())?;
    let mut filter = WatchFilter::new(&root);

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx)?;
    watcher.watch(&root, RecursiveMode::Recursive)?;
    ui::info(&format!("Watching {} for changes (Ctrl+C to stop)", root.display()));

    if let Some(out_dir) = rebuild(&args.build) {
        filter.ignore(out_dir);
    }

    let debounce = Duration::from_millis(args.debounce);
    while let Some(changed) = next_batch(&rx, &filter, debounce)? {
        let first = changed[0].strip_prefix(&root).unwrap_or(&changed[0]);
        let summary = match changed.len() {
            1 => format!("{} changed", first.display()),
            n => format!("{} and {} more changed", first.display(), n - 1),
        };
        ui::info(&format!("{summary}, rebuilding"));
        if let Some(out_dir) = rebuild(&args.build) {
            filter.ignore(out_dir);
        }
    }
    Ok(())
}

/// Reload the config and build. Failures are printed, not returned, so the
/// watcher keeps running.
fn rebuild(args: &BuildArgs) -> Option<PathBuf> {
    let outcome = utils::load_project(&args.project, args.overrides()).and_then(build::run);
    match outcome {
        Ok(result) => {
            build::report(&result);
            Some(result.output_dir)
        }
        Err(err) => {
            ui::error("Build failed");
            eprintln!("{:?}", cli_error_to_miette(err));
            None
        }
    }
}

/// Wait for a relevant change, then keep collecting until `debounce` passes
/// without one. `None` once the watcher is gone.
pub fn next_batch(
    rx: &Receiver<notify::Result<Event>>,
    filter: &WatchFilter,
    debounce: Duration,
) -> Result<Option<Vec<PathBuf>>> {
    let mut changed = Vec::new();
    while changed.is_empty() {
        match rx.recv() {
            Ok(event) => collect(event?, filter, &mut changed),
            Err(_) => return Ok(None),
        }
    }

    loop {
        match rx.recv_timeout(debounce) {
            Ok(event) => collect(event?, filter, &mut changed),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
        }
    }
    tracing::debug!(files = changed.len(), "change batch collected");
    Ok(Some(changed))
}

fn collect(event: Event, filter: &WatchFilter, changed: &mut Vec<PathBuf>) {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return;
    }
    for path in event.paths {
        if filter.is_relevant(&path) && !changed.contains(&path) {
            changed.push(path);
        }
    }
}
