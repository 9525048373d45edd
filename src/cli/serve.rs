//! `docroute serve`: development session with live route updates.

use std::sync::Arc;

use anyhow::Result;

use super::common::load_registry;
use crate::actor::Session;
use crate::config::RouterConfig;
use crate::core::{BuildMode, register_session};
use crate::reload::HotUpdateCoordinator;
use crate::utils::plural_count;

pub async fn serve(config: &RouterConfig) -> Result<()> {
    let (source, registry) = load_registry(config)?;
    crate::log!("serve"; "{} mode, {} from {}",
        BuildMode::DEVELOPMENT.label(),
        plural_count(registry.len(), "route"),
        source.path().display());

    let coordinator = Arc::new(HotUpdateCoordinator::new(registry, BuildMode::DEVELOPMENT));

    let (shutdown_tx, shutdown_rx) = crossbeam::channel::bounded(1);
    register_session(shutdown_tx);

    Session::new(coordinator, source, config.serve.clone())
        .with_shutdown_signal(shutdown_rx)
        .run()
        .await
}
