//! `docroute check`: validate the route table, optionally loading every page.

use anyhow::{Result, bail};

use super::common::load_registry;
use crate::config::RouterConfig;
use crate::core::BuildMode;
use crate::route::Registry;
use crate::utils::plural_count;

pub async fn check(config: &RouterConfig, pages: bool) -> Result<()> {
    let (_, registry) = load_registry(config)?;

    crate::log!("check"; "{}: {}, {}",
        BuildMode::PRODUCTION.label(),
        plural_count(registry.len(), "route"),
        plural_count(registry.redirects().len(), "redirect"));
    if let Some(fallback) = registry.not_found() {
        crate::debug!("check"; "fallback page: {}", fallback);
    }

    if pages {
        let failed = load_all(&registry).await;
        if failed > 0 {
            bail!("{} failed to load", plural_count(failed, "page"));
        }
        crate::log!("check"; "all pages loaded");
    }
    Ok(())
}

/// Invoke every loader. Returns the number of failures, each one logged.
async fn load_all(registry: &Registry) -> usize {
    let mut failed = 0;
    for entry in registry.entries() {
        match registry.load_page(entry).await {
            Ok(page) => crate::debug!("check"; "{} ok ({})", entry.path(), page.content.as_str()),
            Err(e) => {
                crate::log!("error"; "{}: {}", entry.path(), e);
                failed += 1;
            }
        }
    }
    failed
}
