//! Active Page Tracking
//!
//! Records which page each connected browser client is showing, so a
//! route removal only redirects the clients that were on it.

use dashmap::DashMap;

use crate::core::RoutePath;

/// Connection id assigned by the WebSocket actor.
pub type ClientId = u64;

/// Current page per connected client.
///
/// Thread-safe. Supports multiple browser tabs viewing different pages.
#[derive(Debug, Default)]
pub struct ActivePageTracker {
    pages: DashMap<ClientId, RoutePath>,
}

impl ActivePageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the page a client reported.
    pub fn set(&self, client: ClientId, path: impl Into<RoutePath>) {
        self.pages.insert(client, path.into());
    }

    /// Forget a client (called on disconnect).
    pub fn remove(&self, client: ClientId) {
        self.pages.remove(&client);
    }

    pub fn page_of(&self, client: ClientId) -> Option<RoutePath> {
        self.pages.get(&client).map(|entry| entry.value().clone())
    }

    /// Distinct active pages, sorted.
    pub fn get_all(&self) -> Vec<RoutePath> {
        let mut paths: Vec<_> = self.pages.iter().map(|e| e.value().clone()).collect();
        paths.sort();
        paths.dedup();
        paths
    }

    /// Check if any client is viewing `path`.
    pub fn is_active(&self, path: &RoutePath) -> bool {
        self.pages.iter().any(|e| e.value() == path)
    }

    /// Clients whose current page is one of `paths`.
    pub fn clients_on(&self, paths: &[RoutePath]) -> Vec<ClientId> {
        let mut clients: Vec<_> = self
            .pages
            .iter()
            .filter(|e| paths.contains(e.value()))
            .map(|e| *e.key())
            .collect();
        clients.sort_unstable();
        clients
    }

    pub fn clear(&self) {
        self.pages.clear();
    }
}
