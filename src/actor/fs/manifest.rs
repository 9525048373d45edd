//! Turns debounced file changes into registry updates.

use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};

use super::debouncer::ChangeKind;
use crate::manifest::ManifestSource;
use crate::reload::{HotUpdateCoordinator, UpdateAck, UpdateError};
use crate::route::{Registry, RouteEntry};
use crate::utils::{ContentHash, normalize_path};

/// Changes that matter to the route table.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ChangeSet {
    pub manifest: bool,
    pub pages: Vec<PathBuf>,
}

/// What a reload attempt did.
#[derive(Debug)]
pub(crate) enum ReloadOutcome {
    /// Only the manifest was touched and its bytes did not change.
    Unchanged,
    Applied(UpdateAck),
    /// The coordinator refused the new table.
    Rejected(UpdateError),
    /// The manifest could not be read or interpreted.
    Failed(String),
}

/// Tracks the manifest and the page files it references.
#[derive(Debug)]
pub(crate) struct ManifestWatch {
    manifest_path: PathBuf,
    fingerprint: ContentHash,
    page_files: FxHashSet<PathBuf>,
}

impl ManifestWatch {
    pub(crate) fn new(source: &ManifestSource) -> Self {
        Self {
            manifest_path: normalize_path(source.path()),
            fingerprint: source.fingerprint(),
            page_files: collect_page_files(source),
        }
    }

    pub(crate) fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Directories to watch recursively: the manifest's directory plus any
    /// existing page directory outside it.
    pub(crate) fn watch_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .manifest_path
            .parent()
            .into_iter()
            .map(Path::to_path_buf)
            .chain(
                self.page_files
                    .iter()
                    .filter_map(|file| file.parent().map(Path::to_path_buf)),
            )
            .filter(|dir| dir.is_dir())
            .collect();
        dirs.sort();
        dirs.dedup();

        // Sorted order puts ancestors first
        let mut roots: Vec<PathBuf> = Vec::new();
        for dir in dirs {
            if !roots.iter().any(|root| dir.starts_with(root)) {
                roots.push(dir);
            }
        }
        roots
    }

    /// Watch roots not already covered by `watched`.
    pub(crate) fn unwatched_dirs(&self, watched: &[PathBuf]) -> Vec<PathBuf> {
        self.watch_dirs()
            .into_iter()
            .filter(|dir| !watched.iter().any(|root| dir.starts_with(root)))
            .collect()
    }

    /// Keep only the manifest and referenced page files.
    pub(crate) fn classify(&self, changes: &FxHashMap<PathBuf, ChangeKind>) -> Option<ChangeSet> {
        let mut set = ChangeSet::default();
        for (path, kind) in changes {
            if *path == self.manifest_path {
                set.manifest = true;
            } else if self.page_files.contains(path) {
                crate::debug!("watch"; "page {}: {}", kind.label(), path.display());
                set.pages.push(path.clone());
            }
        }
        set.pages.sort();
        (set.manifest || !set.pages.is_empty()).then_some(set)
    }

    /// Re-read the manifest and offer the result to the coordinator.
    ///
    /// Page edits always publish a new snapshot, since that is what drops
    /// page modules cached by the old one. Routes whose page file was not
    /// edited keep their previous loader, so only edited pages show up as
    /// reloaded in the diff.
    pub(crate) async fn reload(
        &mut self,
        changes: &ChangeSet,
        coordinator: &HotUpdateCoordinator,
    ) -> ReloadOutcome {
        let path = self.manifest_path.clone();
        let source = match tokio::task::spawn_blocking(move || ManifestSource::load(&path)).await
        {
            Ok(Ok(source)) => source,
            Ok(Err(e)) => return ReloadOutcome::Failed(e.to_string()),
            Err(e) => return ReloadOutcome::Failed(format!("manifest task failed: {e}")),
        };

        if changes.pages.is_empty() && source.fingerprint() == self.fingerprint {
            return ReloadOutcome::Unchanged;
        }

        let (routes, redirects) = match source.to_parts() {
            Ok(parts) => parts,
            Err(e) => return ReloadOutcome::Failed(e.to_string()),
        };

        let previous = coordinator.snapshot();
        let routes = routes
            .into_iter()
            .map(|entry| keep_unedited_loader(entry, &previous, &changes.pages))
            .collect();

        match coordinator.on_update(routes, redirects) {
            Ok(ack) => {
                self.fingerprint = source.fingerprint();
                self.page_files = collect_page_files(&source);
                ReloadOutcome::Applied(ack)
            }
            Err(e) => ReloadOutcome::Rejected(e),
        }
    }
}

/// Swap in the previous snapshot's loader when the entry reads the same,
/// unedited page file.
fn keep_unedited_loader(entry: RouteEntry, previous: &Registry, edited: &[PathBuf]) -> RouteEntry {
    let Some(source) = entry.loader().source() else {
        return entry;
    };
    if edited.contains(&normalize_path(Path::new(source))) {
        return entry;
    }
    match previous.get(entry.path()) {
        Some(old) if old.loader().source() == Some(source) => {
            RouteEntry::new(entry.path().clone(), old.loader().clone(), entry.meta().clone())
        }
        _ => entry,
    }
}

fn collect_page_files(source: &ManifestSource) -> FxHashSet<PathBuf> {
    let base = normalize_path(source.base_dir());
    source
        .manifest()
        .routes
        .iter()
        .map(|route| normalize_path(&base.join(&route.page)))
        .collect()
}
