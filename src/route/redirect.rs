//! Redirect table: source path -> destination path.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{CycleReason, RouteError};
use crate::core::RoutePath;

/// Redirects consulted before direct route lookup.
///
/// Chains are allowed (`/a -> /b -> /c`) but must be finite: every chain is
/// bounded by a hop limit and may not revisit a path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedirectTable {
    map: FxHashMap<RoutePath, RoutePath>,
}

impl RedirectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a redirect, returning the previous destination for `from`.
    pub fn insert(
        &mut self,
        from: impl Into<RoutePath>,
        to: impl Into<RoutePath>,
    ) -> Option<RoutePath> {
        self.map.insert(from.into(), to.into())
    }

    /// Direct destination of a single hop.
    pub fn target(&self, from: &RoutePath) -> Option<&RoutePath> {
        self.map.get(from)
    }

    pub fn contains(&self, from: &RoutePath) -> bool {
        self.map.contains_key(from)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RoutePath, &RoutePath)> {
        self.map.iter()
    }

    /// Redirect sources in sorted order (deterministic reporting).
    pub fn sources(&self) -> Vec<&RoutePath> {
        let mut sources: Vec<_> = self.map.keys().collect();
        sources.sort();
        sources
    }

    /// Follow the chain starting at `start`.
    ///
    /// Returns `Ok(None)` if `start` is not a redirect source, otherwise the
    /// final destination (which is not itself a redirect source).
    pub fn follow(
        &self,
        start: &RoutePath,
        max_hops: usize,
    ) -> Result<Option<RoutePath>, RouteError> {
        let Some(mut current) = self.map.get(start) else {
            return Ok(None);
        };
        let mut chain = vec![start.clone()];

        loop {
            if chain.contains(current) {
                chain.push(current.clone());
                return Err(RouteError::RedirectCycle {
                    chain,
                    reason: CycleReason::Revisited,
                });
            }
            chain.push(current.clone());

            let Some(next) = self.map.get(current) else {
                return Ok(Some(current.clone()));
            };

            // chain holds start + one path per hop taken so far
            if chain.len() > max_hops {
                chain.push(next.clone());
                return Err(RouteError::RedirectCycle {
                    chain,
                    reason: CycleReason::HopLimit(max_hops),
                });
            }
            current = next;
        }
    }

    /// Check every chain in the table.
    pub fn validate(&self, max_hops: usize) -> Result<(), RouteError> {
        for source in self.sources() {
            self.follow(source, max_hops)?;
        }
        Ok(())
    }
}

impl<F: Into<RoutePath>, T: Into<RoutePath>> FromIterator<(F, T)> for RedirectTable {
    fn from_iter<I: IntoIterator<Item = (F, T)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (from, to) in iter {
            table.insert(from, to);
        }
        table
    }
}
