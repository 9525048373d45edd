//! FileSystem Actor
//!
//! Watches the route manifest and its page files, and offers a rebuilt
//! route table to the coordinator after each debounced burst of changes.
//!
//! ```text
//! Watcher → Debouncer (pure timing) → ManifestWatch (classify + reload) → coordinator
//!                                                             └─ rejected ─> WsActor
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::messages::WsMsg;
use crate::logger::{status_error, status_success, status_unchanged, status_warning};
use crate::reload::HotUpdateCoordinator;
use crate::utils::plural_count;

mod debouncer;
mod manifest;

#[cfg(test)]
mod tests;

use debouncer::Debouncer;
pub(crate) use manifest::ManifestWatch;
use manifest::ReloadOutcome;

/// FileSystem Actor - watches route sources
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    /// Recursively watched roots
    watched: Vec<PathBuf>,
    watch: ManifestWatch,
    debouncer: Debouncer,
    coordinator: Arc<HotUpdateCoordinator>,
    ws_tx: mpsc::Sender<WsMsg>,
}

impl FsActor {
    /// Start watching immediately so no event between startup and `run()`
    /// is lost.
    pub fn new(
        watch: ManifestWatch,
        debounce: Duration,
        coordinator: Arc<HotUpdateCoordinator>,
        ws_tx: mpsc::Sender<WsMsg>,
    ) -> notify::Result<Self> {
        // notify doesn't support async
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watched = Vec::new();
        for dir in watch.watch_dirs() {
            crate::debug!("watch"; "watching {}", dir.display());
            watcher.watch(&dir, RecursiveMode::Recursive)?;
            watched.push(dir);
        }

        Ok(Self {
            notify_rx,
            watcher,
            watched,
            watch,
            debouncer: Debouncer::new(debounce),
            coordinator,
            ws_tx,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watched,
            mut watch,
            mut debouncer,
            coordinator,
            ws_tx,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => status_warning(&format!("watcher error: {e}")),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => debouncer.add_event(&event),
                    None => break,
                },
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    match process_changes(&mut debouncer, &mut watch, &coordinator, &ws_tx).await {
                        Ok(true) => watch_new_dirs(&mut watcher, &mut watched, &watch),
                        Ok(false) => {}
                        Err(()) => break,
                    }
                }
            }
        }
    }
}

/// Watch page directories a newly applied manifest brought in.
fn watch_new_dirs(watcher: &mut impl Watcher, watched: &mut Vec<PathBuf>, watch: &ManifestWatch) {
    for dir in watch.unwatched_dirs(watched) {
        match watcher.watch(&dir, RecursiveMode::Recursive) {
            Ok(()) => {
                crate::debug!("watch"; "watching {}", dir.display());
                watched.push(dir);
            }
            Err(e) => status_warning(&format!("cannot watch {}: {e}", dir.display())),
        }
    }
}

/// Process debounced file changes
///
/// Returns `Ok(true)` when a new route table was applied, `Err(())` if
/// WsActor shut down
async fn process_changes(
    debouncer: &mut Debouncer,
    watch: &mut ManifestWatch,
    coordinator: &HotUpdateCoordinator,
    ws_tx: &mpsc::Sender<WsMsg>,
) -> Result<bool, ()> {
    let Some(raw) = debouncer.take_if_ready() else {
        return Ok(false);
    };
    let Some(changes) = watch.classify(&raw) else {
        return Ok(false);
    };

    match watch.reload(&changes, coordinator).await {
        ReloadOutcome::Unchanged => {
            status_unchanged(&format!("{} unchanged", watch.manifest_path().display()));
        }
        ReloadOutcome::Applied(ack) => {
            let diff = &ack.diff;
            status_success(&format!(
                "routes updated (generation {}): {}, +{} -{} ~{}",
                ack.generation,
                plural_count(ack.routes, "route"),
                diff.added.len(),
                diff.removed.len(),
                diff.changed.len(),
            ));
            return Ok(true);
        }
        ReloadOutcome::Rejected(e) => {
            status_error("update rejected", &e.to_string());
            ws_tx.send(WsMsg::Rejected(e.to_string())).await.map_err(|_| ())?;
        }
        ReloadOutcome::Failed(e) => {
            status_error("failed to reload routes", &e);
            ws_tx.send(WsMsg::Rejected(e)).await.map_err(|_| ())?;
        }
    }
    Ok(false)
}
