//! Route registry error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::RoutePath;
use crate::utils::plural_s;

// ============================================================================
// RouteError
// ============================================================================

/// Why a redirect chain was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleReason {
    /// A path appeared twice in the chain.
    Revisited,
    /// The chain needs more hops than allowed.
    HopLimit(usize),
}

/// Registry construction and resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("duplicate route{}: {}", plural_s(.paths.len()), PathList(.paths))]
    DuplicateRoute { paths: Vec<RoutePath> },

    #[error("{}", describe_cycle(.chain, .reason))]
    RedirectCycle {
        chain: Vec<RoutePath>,
        reason: CycleReason,
    },

    #[error("fallback page `{0}` is not registered")]
    MissingFallback(RoutePath),

    #[error("no route for `{0}`")]
    NotFound(RoutePath),
}

impl RouteError {
    /// Whether this error comes from registry validation (as opposed to a
    /// lookup miss).
    pub fn is_construction_error(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }
}

fn describe_cycle(chain: &[RoutePath], reason: &CycleReason) -> String {
    let arrows = chain
        .iter()
        .map(RoutePath::as_str)
        .collect::<Vec<_>>()
        .join(" -> ");
    match reason {
        CycleReason::Revisited => format!("redirect cycle: {arrows}"),
        CycleReason::HopLimit(max) => {
            format!("redirect chain exceeds {max} hop{}: {arrows}", plural_s(*max))
        }
    }
}

/// Comma-separated path list for display.
struct PathList<'a>(&'a [RoutePath]);

impl fmt::Display for PathList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{path}")?;
        }
        Ok(())
    }
}

// ============================================================================
// LoadError
// ============================================================================

/// Page loader failures. Scoped to a single navigation.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid page data in `{0}`")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("page data path `{found}` does not match route `{expected}`")]
    PathMismatch {
        expected: RoutePath,
        found: RoutePath,
    },

    #[error("loader task failed: {0}")]
    Task(String),

    #[error("{0}")]
    Failed(String),
}
