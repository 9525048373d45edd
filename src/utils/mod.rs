//! Small shared helpers.

mod hash;
mod path;
mod plural;

pub use hash::ContentHash;
pub use path::normalize_path;
pub use plural::{plural_count, plural_s};
