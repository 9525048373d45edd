//! Deferred page loaders.
//!
//! A loader is an explicit function-valued field: calling it starts an
//! asynchronous load and hands back a boxed future for the page module.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::LoadError;
use crate::page::PageModule;

/// Future returned by a [`PageLoader`].
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<PageModule, LoadError>> + Send + 'static>>;

/// Zero-argument asynchronous factory for a page module.
///
/// Cloning is cheap (shared closure). Calling the loader more than once is
/// allowed; each call starts an independent load.
#[derive(Clone)]
pub struct PageLoader {
    load: Arc<dyn Fn() -> LoadFuture + Send + Sync>,
    /// Where the page comes from (for logs), e.g. a file path.
    source: Option<Arc<str>>,
}

impl PageLoader {
    /// Wrap an async closure.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PageModule, LoadError>> + Send + 'static,
    {
        Self {
            load: Arc::new(move || Box::pin(f()) as LoadFuture),
            source: None,
        }
    }

    /// Loader that always yields a clone of `module`.
    pub fn ready(module: PageModule) -> Self {
        Self::new(move || std::future::ready(Ok(module.clone())))
    }

    /// Attach a source label.
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Whether both handles share one closure (one is a clone of the other).
    pub fn same_as(&self, other: &PageLoader) -> bool {
        Arc::ptr_eq(&self.load, &other.load)
    }

    /// Start a load.
    #[inline]
    pub fn load(&self) -> LoadFuture {
        (self.load)()
    }
}

impl fmt::Debug for PageLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageLoader")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
