//! Live route update message protocol
//!
//! JSON messages exchanged with browser clients over WebSocket.
//!
//! # Message Types
//!
//! Server to client:
//! - `connected`: handshake, carries the server version and registry generation
//! - `routes`: a new registry was published; `reloaded` pages kept their
//!   metadata but their content may differ
//! - `navigate`: the client's page was removed, go to `path` instead (where
//!   the path now resolves, or the fallback page)
//! - `rejected`: an update failed validation, the old routes stay active
//! - `ping`
//!
//! Client to server:
//! - `page`: the path the client is currently showing
//! - `pong`

use serde::{Deserialize, Serialize};

use super::coordinator::RegistryEvent;
use crate::core::RoutePath;

/// Message sent over the live update socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LiveMessage {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
        generation: u64,
    },

    /// Route table replaced
    Routes {
        generation: u64,
        added: Vec<RoutePath>,
        removed: Vec<RoutePath>,
        changed: Vec<RoutePath>,
        reloaded: Vec<RoutePath>,
    },

    /// Move the client off a page that no longer exists
    Navigate { path: RoutePath, reason: String },

    /// Update rejected, previous routes still active
    Rejected { error: String },

    /// Client reports its current page
    Page { path: RoutePath },

    /// Keep-alive ping (server → client)
    Ping {
        /// Timestamp for latency measurement
        ts: u64,
    },

    /// Keep-alive pong (client → server)
    Pong { ts: u64 },
}

impl LiveMessage {
    pub fn connected(generation: u64) -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generation,
        }
    }

    pub fn routes(event: &RegistryEvent) -> Self {
        Self::Routes {
            generation: event.generation,
            added: event.added.clone(),
            removed: event.removed.clone(),
            changed: event.changed.clone(),
            reloaded: event.reloaded.clone(),
        }
    }

    pub fn navigate(path: RoutePath, reason: impl Into<String>) -> Self {
        Self::Navigate {
            path,
            reason: reason.into(),
        }
    }

    pub fn rejected(error: impl ToString) -> Self {
        Self::Rejected {
            error: error.to_string(),
        }
    }

    /// Create a ping message
    pub fn ping() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self::Ping { ts }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"ping","ts":0}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
