//! Page types: route metadata, page data and page modules.

mod data;
mod meta;
mod module;

pub use data::{Contributor, GitInfo, PageData, PageHeader};
pub use meta::RouteMeta;
pub use module::{ContentHandle, PageModule};

/// A JSON object map for storing arbitrary metadata fields.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
