//! Configuration sections of `docroute.toml`.

mod routes;
mod serve;

pub use routes::RoutesConfig;
pub use serve::ServeConfig;
