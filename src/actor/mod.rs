//! Actor System for the development session
//!
//! ```text
//! FsActor ──on_update──> HotUpdateCoordinator ──RegistryEvent──> WsActor ──> Browsers
//! (watch)                 (validate + swap)                      (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - Manifest watcher with debouncing
//! - `ws` - WebSocket clients and delivery
//! - `session` - Wires up and runs actors

pub mod fs;
pub mod messages;
pub mod session;
pub mod ws;

pub use session::Session;
