//! In-process navigation against the coordinator's active registry.
//!
//! Every navigation takes a ticket and one registry snapshot. The snapshot
//! serves both the resolve and the load, and the ticket decides whether the
//! result is still wanted once the load finishes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};

use super::coordinator::{HotUpdateCoordinator, RegistryEvent};
use crate::core::RoutePath;
use crate::page::PageModule;
use crate::route::{LoadError, RouteError};

/// A page ready to render.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub requested: RoutePath,
    pub path: RoutePath,
    pub page: Arc<PageModule>,
    pub redirected_from: Option<RoutePath>,
    pub fallback: bool,
}

/// Outcome of one navigation.
#[derive(Debug)]
pub enum NavOutcome {
    Rendered(Rendered),
    /// The loader failed. The registry is untouched and the previous page
    /// stays displayed.
    Failed { path: RoutePath, error: LoadError },
    /// A newer navigation started while this one was loading.
    Superseded,
}

/// What is on screen right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Displayed {
    pub requested: RoutePath,
    pub path: RoutePath,
    /// Registry generation the page was resolved against.
    pub generation: u64,
}

pub struct Navigator {
    coordinator: Arc<HotUpdateCoordinator>,
    ticket: AtomicU64,
    current: Mutex<Option<Displayed>>,
}

impl Navigator {
    pub fn new(coordinator: Arc<HotUpdateCoordinator>) -> Self {
        Self {
            coordinator,
            ticket: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    pub fn coordinator(&self) -> &Arc<HotUpdateCoordinator> {
        &self.coordinator
    }

    pub fn current(&self) -> Option<Displayed> {
        self.current.lock().clone()
    }

    /// Resolve and load `path`.
    ///
    /// Resolution errors (a redirect cycle, or a miss with no fallback page)
    /// are returned as `Err`. Load failures are an `Ok(Failed)` outcome.
    pub async fn navigate(&self, path: impl Into<RoutePath>) -> Result<NavOutcome, RouteError> {
        let ticket = self.ticket.fetch_add(1, Ordering::AcqRel) + 1;
        let snapshot = self.coordinator.snapshot();
        let generation = snapshot.generation();

        let target = snapshot.resolve_target(path)?;
        let loaded = snapshot.load_page(&target.entry).await;

        if self.ticket.load(Ordering::Acquire) != ticket {
            crate::debug!("nav"; "discarding stale load of {}", target.path);
            return Ok(NavOutcome::Superseded);
        }

        let page = match loaded {
            Ok(page) => page,
            Err(error) => {
                return Ok(NavOutcome::Failed {
                    path: target.path,
                    error,
                });
            }
        };

        *self.current.lock() = Some(Displayed {
            requested: target.requested.clone(),
            path: target.path.clone(),
            generation,
        });

        Ok(NavOutcome::Rendered(Rendered {
            requested: target.requested,
            path: target.path,
            page,
            redirected_from: target.redirected_from,
            fallback: target.fallback,
        }))
    }

    /// Re-navigate to the current requested path against the active
    /// registry. `None` if nothing has been displayed yet.
    pub async fn refresh(&self) -> Result<Option<NavOutcome>, RouteError> {
        let Some(requested) = self.current().map(|shown| shown.requested) else {
            return Ok(None);
        };
        self.navigate(requested).await.map(Some)
    }

    /// Refresh whenever an update touches the displayed page. Returns when
    /// the coordinator's event channel closes.
    pub async fn follow_updates(&self, mut events: broadcast::Receiver<RegistryEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if self.is_affected(&event) {
                        self.refresh_logged().await;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    crate::debug!("nav"; "missed {} registry events, refreshing", skipped);
                    self.refresh_logged().await;
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    fn is_affected(&self, event: &RegistryEvent) -> bool {
        self.current()
            .is_some_and(|shown| event.touches(&shown.requested) || event.touches(&shown.path))
    }

    async fn refresh_logged(&self) {
        match self.refresh().await {
            Ok(Some(NavOutcome::Failed { path, error })) => {
                crate::log!("nav"; "failed to reload {}: {}", path, error);
            }
            Err(e) => crate::log!("nav"; "failed to re-resolve current page: {}", e),
            _ => {}
        }
    }
}
