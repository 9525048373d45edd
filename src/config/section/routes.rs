//! `[routes]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [routes]
//! manifest = "routes.json"    # Route manifest, relative to this file
//! not_found = "/404.html"     # Fallback page; "" disables the fallback
//! max_redirect_hops = 8       # Longest allowed redirect chain
//! cache_pages = true          # Keep loaded pages for the registry's lifetime
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::RoutePath;
use crate::route::{DEFAULT_MAX_REDIRECT_HOPS, DEFAULT_NOT_FOUND, RegistryOptions};

/// Route registry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    pub manifest: PathBuf,
    pub not_found: String,
    pub max_redirect_hops: usize,
    pub cache_pages: bool,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("routes.json"),
            not_found: DEFAULT_NOT_FOUND.to_string(),
            max_redirect_hops: DEFAULT_MAX_REDIRECT_HOPS,
            cache_pages: true,
        }
    }
}

impl RoutesConfig {
    /// Options for building the registry.
    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            not_found: (!self.not_found.is_empty()).then(|| RoutePath::new(&self.not_found)),
            max_redirect_hops: self.max_redirect_hops,
            cache_pages: self.cache_pages,
        }
    }

    pub(in crate::config) fn validate(&self, errors: &mut Vec<String>) {
        if self.max_redirect_hops == 0 {
            errors.push("routes.max_redirect_hops must be at least 1".into());
        }
        if !self.not_found.is_empty() && !self.not_found.starts_with('/') {
            errors.push(format!(
                "routes.not_found must be an absolute path, got `{}`",
                self.not_found
            ));
        }
    }
}
