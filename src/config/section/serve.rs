//! `[serve]` section configuration.
//!
//! Contains development session settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5278                 # Live update WebSocket port
//! watch = true                # Reload routes on file changes
//! debounce_ms = 300           # Quiet period before a reload
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the session reachable from LAN.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Development session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// First port tried; the next free one is used if taken.
    pub port: u16,

    pub watch: bool,

    pub debounce_ms: u64,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5278,
            watch: true,
            debounce_ms: 300,
        }
    }
}

impl ServeConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub(in crate::config) fn validate(&self, errors: &mut Vec<String>) {
        if self.port == 0 {
            errors.push("serve.port must be between 1 and 65535".into());
        }
    }
}
