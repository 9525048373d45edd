//! Core types - pure abstractions shared across the codebase.

mod mode;
mod state;
mod url;

pub use mode::BuildMode;
pub use state::{is_shutdown, register_session, setup_shutdown_handler};
pub use url::RoutePath;
