//! Hot-update coordinator: validates rebuilt route tables and swaps them in.
//!
//! ```text
//!            on_update(routes, redirects)
//!                      │
//!   Idle ──try_begin──> Swapping ──build()──┬─ ok ──> store + generation++ + event
//!    ^                                      └─ err ─> previous registry stays
//!    └──────────────── guard dropped ───────────────┘
//! ```
//!
//! The published registry lives in an `ArcSwap`. Readers take a snapshot
//! with [`HotUpdateCoordinator::snapshot`] and keep using it for the whole
//! navigation, so a swap never mixes two tables into one lookup.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use arc_swap::ArcSwap;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::core::{BuildMode, RoutePath};
use crate::route::{RedirectTable, Registry, RegistryOptions, RouteDiff, RouteEntry, RouteError};

/// Buffered events per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 64;

const IDLE: u8 = 0;
const SWAPPING: u8 = 1;

/// Coordinator state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Swapping,
}

/// Why an update was not applied. The previous registry stays active.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("hot updates are disabled in production mode")]
    Disabled,

    #[error("another registry swap is in progress")]
    Busy,

    #[error("update rejected: {0}")]
    Rejected(#[from] RouteError),
}

/// Result of an applied update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAck {
    pub generation: u64,
    pub diff: RouteDiff,
    pub routes: usize,
    pub redirects: usize,
}

/// Broadcast to subscribers after every successful swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEvent {
    pub generation: u64,
    pub added: Vec<RoutePath>,
    pub removed: Vec<RoutePath>,
    pub changed: Vec<RoutePath>,
    pub reloaded: Vec<RoutePath>,
    pub redirects_changed: bool,
}

impl RegistryEvent {
    fn new(generation: u64, diff: &RouteDiff) -> Self {
        Self {
            generation,
            added: diff.added.clone(),
            removed: diff.removed.clone(),
            changed: diff.changed.clone(),
            reloaded: diff.reloaded.clone(),
            redirects_changed: diff.redirects_changed,
        }
    }

    /// Whether a page showing `path` may now resolve differently.
    pub fn touches(&self, path: &RoutePath) -> bool {
        self.redirects_changed
            || self.added.contains(path)
            || self.removed.contains(path)
            || self.changed.contains(path)
            || self.reloaded.contains(path)
    }
}

/// Owner of the active registry.
pub struct HotUpdateCoordinator {
    current: ArcSwap<Registry>,
    state: AtomicU8,
    mode: BuildMode,
    /// Options every replacement registry is built with.
    options: RegistryOptions,
    events: broadcast::Sender<RegistryEvent>,
}

impl HotUpdateCoordinator {
    /// Start with `initial` as generation 0.
    ///
    /// Replacements are built with the initial registry's options.
    pub fn new(initial: Registry, mode: BuildMode) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            options: initial.options().clone(),
            current: ArcSwap::from_pointee(initial.with_generation(0)),
            state: AtomicU8::new(IDLE),
            mode,
            events,
        }
    }

    /// Current registry. Hold on to it for the duration of one navigation.
    #[inline]
    pub fn snapshot(&self) -> Arc<Registry> {
        self.current.load_full()
    }

    /// Generation of the active snapshot. Prefer `snapshot().generation()`
    /// when the registry is used too, so both come from one load.
    pub fn generation(&self) -> u64 {
        self.current.load().generation()
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn state(&self) -> CoordinatorState {
        match self.state.load(Ordering::Acquire) {
            SWAPPING => CoordinatorState::Swapping,
            _ => CoordinatorState::Idle,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Validate a rebuilt route table and publish it.
    pub fn on_update(
        &self,
        routes: Vec<RouteEntry>,
        redirects: RedirectTable,
    ) -> Result<UpdateAck, UpdateError> {
        if !self.mode.hot_update {
            return Err(UpdateError::Disabled);
        }
        let _guard = self.try_begin()?;

        let registry = Registry::builder()
            .options(self.options.clone())
            .routes(routes)
            .redirects(redirects)
            .build()?;

        Ok(self.publish(registry))
    }

    /// Caller holds the swap guard, so the current generation cannot move
    /// underneath.
    fn publish(&self, registry: Registry) -> UpdateAck {
        let previous = self.current.load_full();
        let generation = previous.generation() + 1;
        let diff = previous.diff(&registry);
        let ack_counts = (registry.len(), registry.redirects().len());

        self.current.store(Arc::new(registry.with_generation(generation)));

        // No subscribers is fine
        let _ = self.events.send(RegistryEvent::new(generation, &diff));

        UpdateAck {
            generation,
            diff,
            routes: ack_counts.0,
            redirects: ack_counts.1,
        }
    }

    fn try_begin(&self) -> Result<SwapGuard<'_>, UpdateError> {
        self.state
            .compare_exchange(IDLE, SWAPPING, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| SwapGuard { state: &self.state })
            .map_err(|_| UpdateError::Busy)
    }
}

impl std::fmt::Debug for HotUpdateCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotUpdateCoordinator")
            .field("mode", &self.mode)
            .field("state", &self.state())
            .field("generation", &self.generation())
            .field("routes", &self.current.load().len())
            .finish_non_exhaustive()
    }
}

/// Returns the coordinator to `Idle` on drop, including on early return.
struct SwapGuard<'a> {
    state: &'a AtomicU8,
}

impl Drop for SwapGuard<'_> {
    fn drop(&mut self) {
        self.state.store(IDLE, Ordering::Release);
    }
}
