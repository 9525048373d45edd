//! Reload Module
//!
//! Runtime replacement of the route registry.
//!
//! # Modules
//!
//! - `coordinator` - Validates and atomically swaps registry snapshots
//! - `navigator` - Snapshot-per-navigation resolve + load with stale-result discard
//! - `active` - Which page each connected browser client is showing
//! - `message` - Live update wire messages (routes, navigate, rejected, ...)
//! - `server` - WebSocket acceptor for browser clients

pub mod active;
pub mod coordinator;
pub mod message;
pub mod navigator;
pub mod server;

pub use coordinator::{
    CoordinatorState, HotUpdateCoordinator, RegistryEvent, UpdateAck, UpdateError,
};
pub use navigator::{Displayed, NavOutcome, Navigator, Rendered};
