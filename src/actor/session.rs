//! Dev Session - wires up the live update actors
//!
//! A thin orchestrator that:
//! - Creates communication channels
//! - Starts the WebSocket acceptor
//! - Runs the watcher and the WebSocket actor until shutdown

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::{FsActor, ManifestWatch};
use super::messages::WsMsg;
use super::ws::WsActor;
use crate::config::ServeConfig;
use crate::manifest::ManifestSource;
use crate::reload::HotUpdateCoordinator;
use crate::reload::server::start_ws_server;

const CHANNEL_BUFFER: usize = 32;
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Development session: watcher + live update socket around one coordinator.
pub struct Session {
    coordinator: Arc<HotUpdateCoordinator>,
    source: ManifestSource,
    serve: ServeConfig,
    shutdown_rx: Option<Receiver<()>>,
}

impl Session {
    pub fn new(
        coordinator: Arc<HotUpdateCoordinator>,
        source: ManifestSource,
        serve: ServeConfig,
    ) -> Self {
        Self {
            coordinator,
            source,
            serve,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run until shutdown, or until every actor has stopped.
    pub async fn run(self) -> Result<()> {
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        let port = start_ws_server(self.serve.interface, self.serve.port, ws_tx.clone())?;
        crate::log!("serve"; "live updates on ws://{}:{}", self.serve.interface, port);

        let ws_actor = WsActor::new(ws_rx, Arc::clone(&self.coordinator));
        let ws_handle = tokio::spawn(ws_actor.run());

        let fs_handle = if self.serve.watch {
            let watch = ManifestWatch::new(&self.source);
            let fs_actor = FsActor::new(
                watch,
                self.serve.debounce(),
                Arc::clone(&self.coordinator),
                ws_tx.clone(),
            )
            .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;
            crate::log!("watch"; "watching {}", self.source.path().display());
            Some(tokio::spawn(fs_actor.run()))
        } else {
            crate::log!("watch"; "file watching disabled");
            None
        };

        match self.shutdown_rx {
            Some(rx) => wait_for_signal(&rx).await,
            None => {
                // Without a signal, the session lives as long as the ws actor
                let _ = ws_handle.await;
                return Ok(());
            }
        }

        crate::debug!("serve"; "sending shutdown to ws actor");
        let _ = ws_tx.send(WsMsg::Shutdown).await;
        let _ = tokio::time::timeout(Duration::from_millis(500), ws_handle).await;

        if let Some(handle) = fs_handle {
            handle.abort();
        }
        Ok(())
    }
}

async fn wait_for_signal(rx: &Receiver<()>) {
    loop {
        if rx.try_recv().is_ok() || crate::core::is_shutdown() {
            crate::debug!("serve"; "shutdown signal received");
            return;
        }
        tokio::time::sleep(SHUTDOWN_POLL).await;
    }
}
