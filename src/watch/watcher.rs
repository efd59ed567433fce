//! Watcher thread: notify + debounce, send changed paths to the export loop.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use notify::{RecursiveMode, Watcher};

use crate::error::{OralgenError, Result};

/// Paths whose last event is at least `debounce` old, removed from `pending`.
pub(crate) fn take_settled(
    pending: &mut HashMap<PathBuf, Instant>,
    now: Instant,
    debounce: Duration,
) -> Vec<PathBuf> {
    let mut ready: Vec<PathBuf> = pending
        .iter()
        .filter(|(_, t)| now.duration_since(**t) >= debounce)
        .map(|(p, _)| p.clone())
        .collect();
    ready.sort();
    for p in &ready {
        pending.remove(p);
    }
    ready
}

/// Watch `root` recursively and send debounced absolute paths over `tx`.
///
/// The notify watcher is set up on the calling thread, so a missing folder or
/// an exhausted watch limit is returned here. The debounce loop then runs on
/// its own thread until the receiver is dropped or the notify channel closes.
pub fn spawn_watcher(
    root: &Path,
    debounce_ms: u64,
    tx: mpsc::Sender<PathBuf>,
) -> Result<JoinHandle<()>> {
    let debounce = Duration::from_millis(debounce_ms);

    let (event_tx, event_rx) = mpsc::channel::<Vec<PathBuf>>();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(ev) => {
                let _ = event_tx.send(ev.paths);
            }
            Err(e) => log::warn!("watch event error: {}", e),
        }
    })
    .map_err(|e| OralgenError::Watch(e.to_string()))?;

    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(|e| OralgenError::Watch(format!("{}: {}", root.display(), e)))?;

    let handle = std::thread::spawn(move || {
        // Dropping the watcher stops the notify backend.
        let _watcher = watcher;
        let mut pending: HashMap<PathBuf, Instant> = HashMap::new();

        loop {
            match event_rx.recv_timeout(debounce) {
                Ok(paths) => {
                    let now = Instant::now();
                    for p in paths {
                        pending.insert(p, now);
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    for p in take_settled(&mut pending, Instant::now(), debounce) {
                        if tx.send(p).is_err() {
                            return;
                        }
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        log::warn!("watch: notify channel closed");
    });
    Ok(handle)
}
