//! Route table: entries, redirects and the immutable registry built from them.
//!
//! ```text
//! RouteEntry ─┐
//! RouteEntry ─┼─> RegistryBuilder::build() ─> Registry (immutable)
//! Redirects  ─┘         │
//!                       └─ duplicate / cycle / fallback checks
//! ```

mod conflict;
mod entry;
mod error;
mod loader;
mod redirect;
mod registry;

pub use conflict::detect_duplicates;
pub use entry::RouteEntry;
pub use error::{CycleReason, LoadError, RouteError};
pub use loader::{LoadFuture, PageLoader};
pub use redirect::RedirectTable;
pub use registry::{
    DEFAULT_MAX_REDIRECT_HOPS, DEFAULT_NOT_FOUND, Registry, RegistryBuilder, RegistryOptions,
    Resolution, RouteDiff, Target,
};
