//! Batched, memoised resolution of foreign ids into display names
//!
//! Every page load can reference organisations, creators and categories by
//! id. The resolver keeps one cache per entity kind for the lifetime of a
//! listing session and only asks the backend for ids it has never resolved.
//! Entries are never evicted or overwritten: a slightly stale name is
//! preferred over a redundant lookup.

use std::collections::{BTreeSet, HashMap};

use futures::future::join_all;

use crate::backend::EntityLookup;
use crate::error::Result;
use crate::types::{EntityKind, ForeignRef, ResolvedEntity};

/// Shown while a lookup for the id's kind is outstanding
pub const PLACEHOLDER_LOADING: &str = "Loading…";
/// Shown when an id could not be resolved
pub const PLACEHOLDER_UNKNOWN: &str = "Unknown";

/// Memoised display attributes for one entity kind
#[derive(Debug, Clone, Default)]
pub struct ResolutionCache {
    entries: HashMap<String, ResolvedEntity>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(|e| e.display_name.as_str())
    }

    /// Add entities, keeping any existing entry for the same id.
    /// Returns how many ids were newly cached.
    pub fn merge(&mut self, entities: impl IntoIterator<Item = ResolvedEntity>) -> usize {
        let mut added = 0;
        for entity in entities {
            if !self.entries.contains_key(&entity.id) {
                self.entries.insert(entity.id.clone(), entity);
                added += 1;
            }
        }
        added
    }
}

/// One lookup request: the unresolved ids of a single kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub kind: EntityKind,
    /// Sorted and unique
    pub ids: Vec<String>,
}

/// Per-kind resolution caches plus the planning logic that keeps lookups
/// minimal
#[derive(Debug, Clone, Default)]
pub struct BatchResolver {
    caches: HashMap<EntityKind, ResolutionCache>,
}

impl BatchResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_name(&self, kind: EntityKind, id: &str) -> Option<&str> {
        self.caches.get(&kind).and_then(|c| c.display_name(id))
    }

    pub fn is_resolved(&self, kind: EntityKind, id: &str) -> bool {
        self.caches.get(&kind).is_some_and(|c| c.contains(id))
    }

    /// Group references by kind, drop duplicates and already-cached ids, and
    /// return one request per kind that still has something to resolve.
    pub fn plan(&self, refs: impl IntoIterator<Item = ForeignRef>) -> Vec<BatchRequest> {
        let mut wanted: HashMap<EntityKind, BTreeSet<String>> = HashMap::new();
        for r in refs {
            if r.id.is_empty() || self.is_resolved(r.kind, &r.id) {
                continue;
            }
            wanted.entry(r.kind).or_default().insert(r.id);
        }

        EntityKind::ALL
            .iter()
            .filter_map(|kind| {
                wanted.remove(kind).map(|ids| BatchRequest {
                    kind: *kind,
                    ids: ids.into_iter().collect(),
                })
            })
            .collect()
    }

    /// Merge lookup results into the cache for `kind`
    pub fn merge(&mut self, kind: EntityKind, entities: Vec<ResolvedEntity>) -> usize {
        self.caches.entry(kind).or_default().merge(entities)
    }

    /// Merge a lookup result, or log the failure and leave the ids
    /// unresolved. A later `plan` asks for them again.
    pub fn apply(&mut self, request: &BatchRequest, result: Result<Vec<ResolvedEntity>>) -> usize {
        match result {
            Ok(entities) => self.merge(request.kind, entities),
            Err(e) => {
                tracing::warn!(
                    kind = %request.kind,
                    ids = request.ids.len(),
                    "Failed to resolve {} names: {e}",
                    request.kind
                );
                0
            }
        }
    }
}

/// Issue every planned request concurrently on the current task.
///
/// Results come back in the order of `requests`.
pub async fn run_lookups<L: EntityLookup>(
    requests: &[BatchRequest],
    lookup: &L,
) -> Vec<Result<Vec<ResolvedEntity>>> {
    join_all(
        requests
            .iter()
            .map(|request| lookup.lookup(request.kind, &request.ids)),
    )
    .await
}
