//! Duplicate path detection for route entries.

use rustc_hash::FxHashMap;

use super::RouteEntry;
use crate::core::RoutePath;

/// Paths claimed by more than one entry, sorted.
///
/// Entries normalize their path on construction, so `/docs` and
/// `/docs/index.html` collide here.
pub fn detect_duplicates(entries: &[RouteEntry]) -> Vec<RoutePath> {
    let mut claims: FxHashMap<&RoutePath, usize> = FxHashMap::default();
    for entry in entries {
        *claims.entry(entry.path()).or_default() += 1;
    }

    let mut duplicates: Vec<RoutePath> = claims
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(path, _)| path.clone())
        .collect();
    duplicates.sort();
    duplicates
}
