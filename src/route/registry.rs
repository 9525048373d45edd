//! Route registry - the immutable path -> (loader, metadata) table.
//!
//! A registry is built once from a full set of entries plus a redirect
//! table and never mutated afterwards. Content changes produce a new
//! registry that replaces the old one as a whole.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::conflict::detect_duplicates;
use super::{LoadError, RedirectTable, RouteEntry, RouteError};
use crate::core::RoutePath;
use crate::page::{PageModule, RouteMeta};

/// Default bound on redirect chain length.
pub const DEFAULT_MAX_REDIRECT_HOPS: usize = 8;

/// Default fallback page for unknown paths.
pub const DEFAULT_NOT_FOUND: &str = "/404.html";

/// Registry behavior knobs (from `[routes]` in the config file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Fallback page rendered for unknown paths. `None` disables fallback.
    pub not_found: Option<RoutePath>,
    /// Maximum redirect hops before a chain counts as a cycle (>= 1).
    pub max_redirect_hops: usize,
    /// Cache loaded page modules per entry.
    pub cache_pages: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            not_found: Some(RoutePath::new(DEFAULT_NOT_FOUND)),
            max_redirect_hops: DEFAULT_MAX_REDIRECT_HOPS,
            cache_pages: true,
        }
    }
}

/// Outcome of a single lookup.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Path is a redirect source; re-resolve the destination.
    Redirect(RoutePath),
    /// Path is a registered route.
    Route(Arc<RouteEntry>),
    /// Neither a redirect nor a route.
    NotFound,
}

/// A page ready to be loaded: redirects followed, fallback applied.
#[derive(Debug, Clone)]
pub struct Target {
    /// Path as asked for (normalized).
    pub requested: RoutePath,
    /// Path of the entry that will be rendered.
    pub path: RoutePath,
    pub entry: Arc<RouteEntry>,
    /// Set when `requested` was a redirect source.
    pub redirected_from: Option<RoutePath>,
    /// Set when `entry` is the not-found page standing in for a miss.
    pub fallback: bool,
}

/// Differences between two registry snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteDiff {
    pub added: Vec<RoutePath>,
    pub removed: Vec<RoutePath>,
    /// Paths present in both whose metadata changed.
    pub changed: Vec<RoutePath>,
    /// Paths present in both, same metadata, but a different loader: the
    /// page content may have changed.
    pub reloaded: Vec<RoutePath>,
    pub redirects_changed: bool,
}

impl RouteDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.changed.is_empty()
            && self.reloaded.is_empty()
            && !self.redirects_changed
    }
}

/// Immutable route table plus redirects.
#[derive(Debug)]
pub struct Registry {
    routes: FxHashMap<RoutePath, Arc<RouteEntry>>,
    redirects: RedirectTable,
    options: RegistryOptions,
    /// Publication count assigned by the coordinator; 0 until published.
    generation: u64,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry with no routes and no fallback.
    pub fn empty() -> Self {
        Self {
            routes: FxHashMap::default(),
            redirects: RedirectTable::new(),
            options: RegistryOptions {
                not_found: None,
                ..RegistryOptions::default()
            },
            generation: 0,
        }
    }

    // ========================================================================
    // resolution
    // ========================================================================

    /// Resolve one path: redirects first, then direct lookup.
    ///
    /// A redirect result carries the final destination of the chain; the
    /// caller re-resolves it.
    pub fn resolve(&self, path: impl Into<RoutePath>) -> Result<Resolution, RouteError> {
        let path = path.into();

        if let Some(dest) = self
            .redirects
            .follow(&path, self.options.max_redirect_hops)?
        {
            return Ok(Resolution::Redirect(dest));
        }

        Ok(match self.routes.get(&path) {
            Some(entry) => Resolution::Route(Arc::clone(entry)),
            None => Resolution::NotFound,
        })
    }

    /// Resolve to a loadable entry, following a redirect and falling back to
    /// the not-found page on a miss.
    ///
    /// Fails with `NotFound` only when no fallback page is configured.
    pub fn resolve_target(&self, path: impl Into<RoutePath>) -> Result<Target, RouteError> {
        let requested = path.into();

        let (path, redirected_from, entry) = match self.resolve(requested.clone())? {
            Resolution::Route(entry) => (requested.clone(), None, Some(entry)),
            Resolution::Redirect(dest) => {
                // Chain destinations are never redirect sources themselves
                let entry = self.routes.get(&dest).cloned();
                (dest, Some(requested.clone()), entry)
            }
            Resolution::NotFound => (requested.clone(), None, None),
        };

        if let Some(entry) = entry {
            return Ok(Target {
                requested,
                path,
                entry,
                redirected_from,
                fallback: false,
            });
        }

        let Some(not_found) = &self.options.not_found else {
            return Err(RouteError::NotFound(path));
        };
        let entry = self
            .routes
            .get(not_found)
            .cloned()
            .ok_or_else(|| RouteError::MissingFallback(not_found.clone()))?;

        Ok(Target {
            requested,
            path: not_found.clone(),
            entry,
            redirected_from,
            fallback: true,
        })
    }

    /// Invoke the entry's loader (cached per entry unless disabled).
    pub async fn load_page(&self, entry: &RouteEntry) -> Result<Arc<PageModule>, LoadError> {
        if self.options.cache_pages {
            entry.load_cached().await
        } else {
            entry.load_uncached().await
        }
    }

    /// Metadata for a registered path, without loading. Redirects are not
    /// followed.
    pub fn metadata_of(&self, path: impl Into<RoutePath>) -> Option<&RouteMeta> {
        self.routes.get(&path.into()).map(|entry| entry.meta())
    }

    // ========================================================================
    // inspection
    // ========================================================================

    pub fn get(&self, path: impl Into<RoutePath>) -> Option<Arc<RouteEntry>> {
        self.routes.get(&path.into()).cloned()
    }

    pub fn contains(&self, path: impl Into<RoutePath>) -> bool {
        self.routes.contains_key(&path.into())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered paths in sorted order.
    pub fn paths(&self) -> Vec<&RoutePath> {
        let mut paths: Vec<_> = self.routes.keys().collect();
        paths.sort();
        paths
    }

    /// Entries in path order.
    pub fn entries(&self) -> Vec<&Arc<RouteEntry>> {
        self.paths()
            .into_iter()
            .filter_map(|path| self.routes.get(path))
            .collect()
    }

    pub fn redirects(&self) -> &RedirectTable {
        &self.redirects
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    pub fn not_found(&self) -> Option<&RoutePath> {
        self.options.not_found.as_ref()
    }

    /// Generation this snapshot was published as.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// What changed going from `self` to `newer`.
    pub fn diff(&self, newer: &Registry) -> RouteDiff {
        let mut diff = RouteDiff {
            redirects_changed: self.redirects != newer.redirects,
            ..RouteDiff::default()
        };

        for (path, entry) in &newer.routes {
            match self.routes.get(path) {
                None => diff.added.push(path.clone()),
                Some(old) if old.meta() != entry.meta() => diff.changed.push(path.clone()),
                Some(old) if !old.loader().same_as(entry.loader()) => {
                    diff.reloaded.push(path.clone());
                }
                Some(_) => {}
            }
        }
        diff.removed = self
            .routes
            .keys()
            .filter(|path| !newer.routes.contains_key(*path))
            .cloned()
            .collect();

        diff.added.sort();
        diff.removed.sort();
        diff.changed.sort();
        diff.reloaded.sort();
        diff
    }
}

// ============================================================================
// builder
// ============================================================================

/// Collects entries and redirects, validating everything on `build()`.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<RouteEntry>,
    redirects: RedirectTable,
    options: RegistryOptions,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(mut self, options: RegistryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn route(mut self, entry: RouteEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn routes(mut self, entries: impl IntoIterator<Item = RouteEntry>) -> Self {
        self.entries.extend(entries);
        self
    }

    pub fn redirect(mut self, from: impl Into<RoutePath>, to: impl Into<RoutePath>) -> Self {
        self.redirects.insert(from, to);
        self
    }

    pub fn redirects(mut self, table: RedirectTable) -> Self {
        self.redirects = table;
        self
    }

    /// Validate and freeze.
    ///
    /// Checks, in order: duplicate paths, redirect chains, fallback page.
    pub fn build(self) -> Result<Registry, RouteError> {
        let Self {
            entries,
            redirects,
            mut options,
        } = self;

        let duplicates = detect_duplicates(&entries);
        if !duplicates.is_empty() {
            return Err(RouteError::DuplicateRoute { paths: duplicates });
        }

        options.max_redirect_hops = options.max_redirect_hops.max(1);
        redirects.validate(options.max_redirect_hops)?;

        let routes: FxHashMap<RoutePath, Arc<RouteEntry>> = entries
            .into_iter()
            .map(|entry| (entry.path().clone(), Arc::new(entry)))
            .collect();

        if let Some(not_found) = &options.not_found
            && !routes.contains_key(not_found)
        {
            return Err(RouteError::MissingFallback(not_found.clone()));
        }

        crate::debug_do! {
            for source in redirects.sources() {
                if routes.contains_key(source) {
                    crate::debug!("routes"; "redirect {} shadows a registered route", source);
                }
            }
        }

        Ok(Registry {
            routes,
            redirects,
            options,
            generation: 0,
        })
    }
}
