use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::core::RoutePath;
use crate::reload::active::ActivePageTracker;
use crate::reload::message::LiveMessage;

use super::{RegisteredClient, WsActor};

const READ_POLL: Duration = Duration::from_millis(100);

impl WsActor {
    /// Add a new client connection
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Keep blocking mode during handshake, switch to non-blocking after
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                return;
            }
        };
        let _ = ws.get_ref().set_nonblocking(true);

        let hello = LiveMessage::connected(self.coordinator.generation());
        if let Err(e) = ws.send(Message::Text(hello.to_json().into())) {
            crate::log!("ws"; "failed to send connected message: {}", e);
            return;
        }

        let id = self.next_client_id();

        // Catch the page report sent from the client's onopen, so the
        // next update already knows where this client is
        if let Some(path) = Self::try_read_initial_page(&mut ws) {
            self.active.set(id, path);
        }

        let mut clients = self.clients.lock();
        crate::debug!("ws"; "client {} connected (total: {}, page: {:?})",
            id, clients.len() + 1, self.active.page_of(id));
        clients.push(RegisteredClient { id, ws });
    }

    /// Background thread to read client messages (non-blocking poll)
    pub(super) fn client_reader_loop(
        clients: Arc<Mutex<Vec<RegisteredClient>>>,
        active: Arc<ActivePageTracker>,
        stopped: Arc<AtomicBool>,
    ) {
        while !stopped.load(Ordering::Acquire) {
            std::thread::sleep(READ_POLL);

            let mut clients = clients.lock();
            clients.retain_mut(|client| loop {
                match client.ws.read() {
                    Ok(Message::Text(text)) => match LiveMessage::from_json(&text) {
                        Some(LiveMessage::Page { path }) => {
                            crate::debug!("ws"; "client {} page: {}", client.id, path);
                            active.set(client.id, path);
                        }
                        Some(LiveMessage::Ping { ts }) => {
                            let pong = LiveMessage::Pong { ts }.to_json();
                            let _ = client.ws.send(Message::Text(pong.into()));
                        }
                        _ => {}
                    },
                    Ok(Message::Close(_)) => {
                        active.remove(client.id);
                        break false;
                    }
                    Ok(_) => {}
                    Err(tungstenite::Error::Io(ref e))
                        if e.kind() == std::io::ErrorKind::WouldBlock =>
                    {
                        break true;
                    }
                    Err(_) => {
                        active.remove(client.id);
                        break false;
                    }
                }
            });

            if clients.is_empty() {
                active.clear();
            }
        }
    }

    /// Try to read initial page message from client
    ///
    /// Client sends `{type: "page", path: "/..."}` in its onopen callback.
    fn try_read_initial_page(ws: &mut WebSocket<TcpStream>) -> Option<RoutePath> {
        for _ in 0..5 {
            match ws.read() {
                Ok(Message::Text(text)) => {
                    if let Some(LiveMessage::Page { path }) = LiveMessage::from_json(&text) {
                        return Some(path);
                    }
                }
                Err(tungstenite::Error::Io(ref e))
                    if e.kind() == std::io::ErrorKind::WouldBlock =>
                {
                    // Message not yet arrived, wait a bit
                    std::thread::sleep(Duration::from_millis(5));
                }
                _ => break,
            }
        }
        None
    }
}
