//! Route entry: loader + metadata for one path.

use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;

use super::{LoadError, PageLoader};
use crate::core::RoutePath;
use crate::page::{PageModule, RouteMeta};

/// One registered route.
///
/// The loaded module is cached for the lifetime of the entry, which is the
/// lifetime of the registry snapshot that owns it. Concurrent loads of the
/// same entry wait on a single in-flight load; a failed load is not cached.
pub struct RouteEntry {
    path: RoutePath,
    meta: RouteMeta,
    loader: PageLoader,
    cache: OnceCell<Arc<PageModule>>,
}

impl RouteEntry {
    pub fn new(path: impl Into<RoutePath>, loader: PageLoader, meta: RouteMeta) -> Self {
        Self {
            path: path.into(),
            meta,
            loader,
            cache: OnceCell::new(),
        }
    }

    #[inline]
    pub fn path(&self) -> &RoutePath {
        &self.path
    }

    #[inline]
    pub fn meta(&self) -> &RouteMeta {
        &self.meta
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.meta.title
    }

    pub fn loader(&self) -> &PageLoader {
        &self.loader
    }

    /// Whether a module has been cached.
    pub fn is_loaded(&self) -> bool {
        self.cache.initialized()
    }

    /// Load once, share the result with every later caller.
    pub async fn load_cached(&self) -> Result<Arc<PageModule>, LoadError> {
        self.cache
            .get_or_try_init(|| async { self.loader.load().await.map(Arc::new) })
            .await
            .map(Arc::clone)
    }

    /// Invoke the loader directly, bypassing the cache.
    pub async fn load_uncached(&self) -> Result<Arc<PageModule>, LoadError> {
        self.loader.load().await.map(Arc::new)
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("path", &self.path)
            .field("meta", &self.meta)
            .field("loader", &self.loader)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::page::PageData;

    fn counting_entry(count: Arc<AtomicUsize>) -> RouteEntry {
        let loader = PageLoader::new(move || {
            let count = Arc::clone(&count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Ok(PageModule::new("docs.vue", PageData::new("/docs/", "Docs")))
            }
        });
        RouteEntry::new("/docs", loader, RouteMeta::new("Docs"))
    }

    #[tokio::test]
    async fn test_load_cached_runs_loader_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let entry = counting_entry(Arc::clone(&count));
        assert!(!entry.is_loaded());

        let (a, b) = tokio::join!(entry.load_cached(), entry.load_cached());
        let (a, b) = (a.unwrap(), b.unwrap());

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(entry.is_loaded());

        entry.load_cached().await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_uncached_runs_loader_each_time() {
        let count = Arc::new(AtomicUsize::new(0));
        let entry = counting_entry(Arc::clone(&count));

        entry.load_uncached().await.unwrap();
        entry.load_uncached().await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!entry.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let loader = PageLoader::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(LoadError::Failed("network down".into()))
                } else {
                    Ok(PageModule::new("a.vue", PageData::new("/a/", "A")))
                }
            }
        });
        let entry = RouteEntry::new("/a/", loader, RouteMeta::new("A"));

        assert!(entry.load_cached().await.is_err());
        assert!(!entry.is_loaded());
        let page = entry.load_cached().await.unwrap();
        assert_eq!(page.title(), "A");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_entry_normalizes_path() {
        let entry = RouteEntry::new(
            "/guide",
            PageLoader::ready(PageModule::new("g.vue", PageData::new("/guide/", "Guide"))),
            RouteMeta::new("Guide"),
        );
        assert_eq!(entry.path(), "/guide/");
        assert_eq!(entry.title(), "Guide");
    }
}
