//! Route manifest error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::RoutePath;

/// Failures reading or interpreting a route manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid route manifest `{0}`")]
    Json(PathBuf, #[source] serde_json::Error),

    /// Two raw redirect sources normalize to the same path.
    #[error("redirect source `{0}` is declared more than once")]
    DuplicateRedirect(RoutePath),
}
