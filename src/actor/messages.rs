//! Actor Message Types
//!
//! ```text
//! FsActor ──WsMsg::Rejected──> WsActor <──AddClient── ws server thread
//!                                 ^
//! coordinator ──RegistryEvent─────┘ (broadcast channel)
//! ```

use std::net::TcpStream;

/// Messages to WsActor
#[derive(Debug)]
pub enum WsMsg {
    /// Raw TCP stream from the acceptor thread; the actor does the handshake
    AddClient(TcpStream),
    /// A route update failed; tell every client
    Rejected(String),
    /// Close all clients and stop
    Shutdown,
}
