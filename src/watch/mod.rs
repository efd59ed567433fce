//! Session watcher: re-export interviews when their saved session changes.
//!
//! Uses the notify crate to watch the sessions folder, debounces events, and
//! runs the export pipeline for each changed `.json` session in every
//! configured format.

mod watcher;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::config::Config;
use crate::error::{OralgenError, Result};
use crate::export::{
    compute_file_hash, export_session, is_session_file, today, ExportReport, OutputRegistry,
};

/// Remembers the hash each session had when it was last exported, and which
/// output files belong to which session.
#[derive(Debug, Default)]
pub struct ExportTracker {
    last_hash: HashMap<PathBuf, String>,
    outputs: OutputRegistry,
}

impl ExportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `hash` differs from the last exported hash of `path`.
    pub fn is_changed(&self, path: &Path, hash: &str) -> bool {
        self.last_hash.get(path).map(|h| h != hash).unwrap_or(true)
    }

    pub fn record(&mut self, path: &Path, hash: String) {
        self.last_hash.insert(path.to_path_buf(), hash);
    }
}

/// Handle a single file change: hash check, then export in every configured
/// format. Returns the reports of the files written (empty when skipped).
pub fn handle_file_change(
    config: &Config,
    tracker: &mut ExportTracker,
    path: &Path,
) -> Result<Vec<ExportReport>> {
    if !is_session_file(path) || !path.is_file() {
        return Ok(Vec::new());
    }

    let current_hash = compute_file_hash(path)?;
    if !tracker.is_changed(path, &current_hash) {
        log::debug!("watch: {} unchanged, skipping", path.display());
        return Ok(Vec::new());
    }

    let start = std::time::Instant::now();
    let options = config.export.gedcom_options();
    let date = today();
    let mut reports = Vec::with_capacity(config.export.formats.len());
    for format in &config.export.formats {
        reports.push(export_session(
            path,
            config.output_folder(),
            *format,
            &options,
            date,
            &mut tracker.outputs,
        )?);
    }
    tracker.record(path, current_hash);

    log::info!(
        "watch: {} ({} file(s) written) in {:?}",
        path.display(),
        reports.len(),
        start.elapsed()
    );
    Ok(reports)
}

/// Run the session watcher: start notify on the sessions folder, then handle
/// debounced paths until the watcher thread exits.
///
/// Fails immediately if the folder cannot be watched.
pub fn run_watcher(config: Config, debounce_ms: u64) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let handle = watcher::spawn_watcher(config.sessions_folder(), debounce_ms, tx)?;

    let mut tracker = ExportTracker::new();
    for path in rx {
        if let Err(e) = handle_file_change(&config, &mut tracker, &path) {
            log::error!("watch handle_file_change {}: {}", path.display(), e);
        }
    }

    handle
        .join()
        .map_err(|_| OralgenError::Watch("watcher thread panicked".to_string()))
}
