//! Page module: what a route loader produces.

use serde::{Deserialize, Serialize};

use super::PageData;

/// Opaque handle to renderable content.
///
/// The renderer decides what it points at (a compiled component path,
/// a pre-rendered HTML fragment, ...); the router only passes it along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHandle(String);

impl ContentHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lazily-produced unit: content handle plus page data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageModule {
    pub content: ContentHandle,
    pub data: PageData,
}

impl PageModule {
    pub fn new(content: impl Into<String>, data: PageData) -> Self {
        Self {
            content: ContentHandle::new(content),
            data,
        }
    }

    /// Page title from its data record.
    pub fn title(&self) -> &str {
        &self.data.title
    }
}
