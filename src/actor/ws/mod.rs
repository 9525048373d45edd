//! WebSocket Actor - Bidirectional Communication
//!
//! This actor is responsible for:
//! - Managing WebSocket client connections
//! - Broadcasting route updates to all connected clients
//! - Redirecting clients whose page disappeared
//! - Receiving client messages (current page, pings)
//!
//! # Architecture
//!
//! ```text
//! coordinator --[RegistryEvent]--> WsActor --[routes/navigate]--> Clients
//! FsActor ------[Rejected]-------^    ^                              |
//!                                     +----------[page path]---------+
//! ```

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use crate::core::RoutePath;
use crate::reload::active::{ActivePageTracker, ClientId};
use crate::reload::message::LiveMessage;
use crate::reload::{HotUpdateCoordinator, RegistryEvent};
use crate::route::Registry;

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// A connected WebSocket client
struct RegisteredClient {
    id: ClientId,
    ws: WebSocket<TcpStream>,
}

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    /// Channel to receive messages
    rx: mpsc::Receiver<WsMsg>,
    coordinator: Arc<HotUpdateCoordinator>,
    /// Connected clients (shared for broadcast + read threads)
    clients: Arc<Mutex<Vec<RegisteredClient>>>,
    active: Arc<ActivePageTracker>,
    next_id: AtomicU64,
    /// Tells the reader thread to exit
    stopped: Arc<AtomicBool>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>, coordinator: Arc<HotUpdateCoordinator>) -> Self {
        Self {
            rx,
            coordinator,
            clients: Arc::new(Mutex::new(Vec::new())),
            active: Arc::new(ActivePageTracker::new()),
            next_id: AtomicU64::new(1),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Pages reported by connected clients.
    pub fn active_pages(&self) -> Arc<ActivePageTracker> {
        Arc::clone(&self.active)
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients = Arc::clone(&self.clients);
        let active = Arc::clone(&self.active);
        let stopped = Arc::clone(&self.stopped);
        std::thread::spawn(move || Self::client_reader_loop(clients, active, stopped));

        let mut events = self.coordinator.subscribe();
        let mut keepalive = tokio::time::interval(PING_INTERVAL);
        keepalive.tick().await;

        loop {
            tokio::select! {
                msg = self.rx.recv() => match msg {
                    Some(WsMsg::AddClient(stream)) => self.add_client(stream),
                    Some(WsMsg::Rejected(error)) => {
                        self.broadcast(&LiveMessage::rejected(error));
                    }
                    Some(WsMsg::Shutdown) | None => break,
                },
                event = events.recv() => match event {
                    Ok(event) => self.on_registry_event(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        crate::debug!("ws"; "skipped {} registry events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = keepalive.tick() => self.broadcast(&LiveMessage::ping()),
            }
        }

        crate::debug!("ws"; "shutting down");
        self.stopped.store(true, Ordering::Release);
        for mut client in self.clients.lock().drain(..) {
            let _ = client.ws.close(None);
        }
        self.active.clear();
    }

    /// Broadcast the update, then move clients off removed pages.
    fn on_registry_event(&self, event: &RegistryEvent) {
        self.broadcast(&LiveMessage::routes(event));

        let snapshot = self.coordinator.snapshot();
        for (clients, message) in stranded_clients(&self.active, &snapshot, &event.removed) {
            crate::debug!("ws"; "moving {} clients: {:?}", clients.len(), message);
            self.send_to_clients(&clients, &message);
        }
    }

    fn next_client_id(&self) -> ClientId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Where to send clients still showing a removed page.
///
/// A removed path that now redirects somewhere is followed; otherwise the
/// client lands on the not-found page, or the root when there is none.
fn stranded_clients(
    active: &ActivePageTracker,
    snapshot: &Registry,
    removed: &[RoutePath],
) -> Vec<(Vec<ClientId>, LiveMessage)> {
    removed
        .iter()
        .filter_map(|path| {
            let clients = active.clients_on(std::slice::from_ref(path));
            if clients.is_empty() {
                return None;
            }
            let message = match snapshot.resolve_target(path) {
                Ok(target) if !target.fallback => LiveMessage::navigate(target.path, "page moved"),
                Ok(target) => LiveMessage::navigate(target.path, "page removed"),
                Err(_) => LiveMessage::navigate(RoutePath::root(), "page removed"),
            };
            Some((clients, message))
        })
        .collect()
}
