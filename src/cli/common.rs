//! Common utilities shared across CLI commands.

use anyhow::{Context, Result};

use crate::config::RouterConfig;
use crate::manifest::ManifestSource;
use crate::route::Registry;
use crate::utils::plural_count;

/// Read the configured manifest and build a validated registry from it.
pub fn load_registry(config: &RouterConfig) -> Result<(ManifestSource, Registry)> {
    let path = config.manifest_path();
    let source = ManifestSource::load(path)?;
    let (entries, redirects) = source.to_parts()?;

    let registry = Registry::builder()
        .options(config.routes.registry_options())
        .routes(entries)
        .redirects(redirects)
        .build()
        .with_context(|| format!("invalid route table in `{}`", path.display()))?;

    crate::debug!("routes"; "loaded {} and {} from {} ({})",
        plural_count(registry.len(), "route"),
        plural_count(registry.redirects().len(), "redirect"),
        path.display(),
        source.fingerprint());
    Ok((source, registry))
}
