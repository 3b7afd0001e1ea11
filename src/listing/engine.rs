//! Listing orchestrator
//!
//! `ListingEngine` ties filter state, the page stack and the resolver into one
//! state machine (`Idle → Loading → Loaded | Errored`). Intent is applied
//! synchronously: every filter or paging call updates local state and returns
//! the `FetchRequest` to run. Results come back through `apply_fetch`, which
//! discards any response that is not for the most recently issued request.
//!
//! `load` and `mutate` are the async drivers used by the CLI; tests can also
//! drive the machine by hand to interleave responses.

use std::collections::{BTreeSet, HashMap};

use crate::backend::{EntityLookup, ListingBackend, Mutation, MutationBackend, Page, PageQuery};
use crate::error::Result;
use crate::types::{Cursor, EntityKind, ResolvedEntity};

use super::domain::{ListingDomain, ListingItem};
use super::filter::{FilterCriteria, FilterState, ScopeTab};
use super::pagination::PageStack;
use super::resolve::{
    BatchRequest, BatchResolver, PLACEHOLDER_LOADING, PLACEHOLDER_UNKNOWN, run_lookups,
};
use super::stats::ListingStats;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub page_size: u32,
    /// Id of the signed-in user, sent as `createdBy` on the "mine" tab
    pub viewer_id: Option<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            viewer_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// A page fetch issued by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Monotonic id; only the latest generation may change engine state
    pub generation: u64,
    pub cursor: Option<Cursor>,
    pub criteria: FilterCriteria,
    pub query: PageQuery,
}

/// What `apply_fetch` did with a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page applied; these lookups are needed for its foreign ids
    Loaded { lookups: Vec<BatchRequest> },
    /// Fetch failed; previous items stay on screen
    Failed,
    /// Response belonged to a superseded request and was dropped
    Stale,
}

pub struct ListingEngine<D: ListingDomain> {
    domain: D,
    options: EngineOptions,
    filters: FilterState,
    pages: PageStack,
    phase: ListingPhase,
    items: Vec<D::Item>,
    selection: BTreeSet<String>,
    has_more: bool,
    last_id: Option<Cursor>,
    stats: ListingStats,
    resolver: BatchResolver,
    pending_lookups: HashMap<EntityKind, usize>,
    generation: u64,
    last_request: Option<FetchRequest>,
    last_error: Option<String>,
}

impl<D: ListingDomain> ListingEngine<D> {
    pub fn new(domain: D, options: EngineOptions) -> Self {
        Self::with_filters(domain, options, FilterCriteria::default())
    }

    pub fn with_filters(domain: D, options: EngineOptions, criteria: FilterCriteria) -> Self {
        Self {
            domain,
            options,
            filters: FilterState::new(criteria),
            pages: PageStack::new(),
            phase: ListingPhase::Idle,
            items: Vec::new(),
            selection: BTreeSet::new(),
            has_more: false,
            last_id: None,
            stats: ListingStats::default(),
            resolver: BatchResolver::new(),
            pending_lookups: HashMap::new(),
            generation: 0,
            last_request: None,
            last_error: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn phase(&self) -> ListingPhase {
        self.phase
    }

    pub fn items(&self) -> &[D::Item] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&D::Item> {
        self.items.iter().find(|i| i.id() == id)
    }

    pub fn criteria(&self) -> &FilterCriteria {
        self.filters.current()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn pages(&self) -> &PageStack {
        &self.pages
    }

    pub fn page_number(&self) -> usize {
        self.pages.page_number()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn can_go_next(&self) -> bool {
        self.phase == ListingPhase::Loaded && self.has_more && self.last_id.is_some()
    }

    pub fn can_go_previous(&self) -> bool {
        matches!(self.phase, ListingPhase::Loaded | ListingPhase::Errored)
            && self.pages.can_retreat()
    }

    pub fn stats(&self) -> &ListingStats {
        &self.stats
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_request(&self) -> Option<&FetchRequest> {
        self.last_request.as_ref()
    }

    pub fn resolver(&self) -> &BatchResolver {
        &self.resolver
    }

    pub fn is_resolving(&self, kind: EntityKind) -> bool {
        self.pending_lookups.get(&kind).is_some_and(|n| *n > 0)
    }

    /// Display name for a foreign id, or a placeholder if it is unresolved
    pub fn display_name(&self, kind: EntityKind, id: &str) -> &str {
        match self.resolver.display_name(kind, id) {
            Some(name) => name,
            None if self.is_resolving(kind) => PLACEHOLDER_LOADING,
            None => PLACEHOLDER_UNKNOWN,
        }
    }

    // ------------------------------------------------------------------
    // Intent
    // ------------------------------------------------------------------

    /// Initial fetch when the listing is first shown
    pub fn start(&mut self) -> FetchRequest {
        self.issue()
    }

    /// Replace the criteria. Returns `None` if nothing changed.
    pub fn set_filters(&mut self, criteria: FilterCriteria) -> Option<FetchRequest> {
        if !self.filters.replace(criteria) {
            return None;
        }
        Some(self.on_filters_changed())
    }

    pub fn update_filters(
        &mut self,
        f: impl FnOnce(FilterCriteria) -> FilterCriteria,
    ) -> Option<FetchRequest> {
        if !self.filters.update(f) {
            return None;
        }
        Some(self.on_filters_changed())
    }

    /// Apply committed (debounced) search text
    pub fn set_search_text(&mut self, text: impl Into<String>) -> Option<FetchRequest> {
        let text = text.into();
        self.update_filters(|c| c.with_search_text(text))
    }

    /// Advance to the next page. Only allowed once the current page has
    /// loaded and the backend reported more results.
    pub fn next_page(&mut self) -> Option<FetchRequest> {
        if self.phase != ListingPhase::Loaded || !self.has_more {
            return None;
        }
        let Some(cursor) = self.last_id.clone() else {
            tracing::warn!(
                listing = self.domain.name(),
                "Backend reported more results without a cursor"
            );
            return None;
        };
        self.pages.advance(cursor);
        Some(self.issue())
    }

    /// Go back one page by replaying the cursor below the top of the stack
    pub fn previous_page(&mut self) -> Option<FetchRequest> {
        if !matches!(self.phase, ListingPhase::Loaded | ListingPhase::Errored) {
            return None;
        }
        if !self.pages.retreat() {
            return None;
        }
        Some(self.issue())
    }

    /// Re-issue the failed fetch (same cursor, same criteria)
    pub fn retry(&mut self) -> Option<FetchRequest> {
        if self.phase != ListingPhase::Errored {
            return None;
        }
        Some(self.issue())
    }

    /// Re-fetch the page currently on screen
    pub fn refresh(&mut self) -> FetchRequest {
        self.issue()
    }

    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if self.selection.remove(id) {
            return false;
        }
        self.selection.insert(id.to_string());
        true
    }

    pub fn select_all(&mut self) {
        self.selection
            .extend(self.items.iter().map(|i| i.id().to_string()));
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn on_filters_changed(&mut self) -> FetchRequest {
        self.pages.reset();
        self.selection.clear();
        self.issue()
    }

    fn issue(&mut self) -> FetchRequest {
        self.generation += 1;
        self.phase = ListingPhase::Loading;

        let cursor = self.pages.current().cloned();
        let criteria = self.filters.current().clone();
        let query = self.build_query(&criteria, cursor.clone());

        tracing::debug!(
            listing = self.domain.name(),
            generation = self.generation,
            page = self.pages.page_number(),
            stack_version = self.pages.version(),
            cursor = ?cursor,
            "Issuing page fetch"
        );

        let request = FetchRequest {
            generation: self.generation,
            cursor,
            criteria,
            query,
        };
        self.last_request = Some(request.clone());
        request
    }

    fn build_query(&self, criteria: &FilterCriteria, cursor: Option<Cursor>) -> PageQuery {
        let created_by = match criteria.scope {
            ScopeTab::All => None,
            ScopeTab::Mine => {
                if self.options.viewer_id.is_none() {
                    tracing::warn!(
                        listing = self.domain.name(),
                        "No viewer id configured; the 'mine' tab shows all items"
                    );
                }
                self.options.viewer_id.clone()
            }
        };

        PageQuery {
            limit: self.options.page_size,
            start_after: cursor,
            search: criteria.search().map(str::to_string),
            status: criteria.status.clone(),
            sort: criteria.sort.as_str().to_string(),
            created_by,
            filters: self.domain.filter_params(criteria),
        }
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    /// Apply the result of `request`.
    ///
    /// Only the most recently issued request may change state; anything older
    /// is reported as `Stale` and ignored.
    pub fn apply_fetch(
        &mut self,
        request: &FetchRequest,
        result: Result<Page<D::Item>>,
    ) -> FetchOutcome {
        if request.generation != self.generation {
            tracing::debug!(
                listing = self.domain.name(),
                stale = request.generation,
                current = self.generation,
                "Discarding superseded page response"
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(page) => {
                self.phase = ListingPhase::Loaded;
                self.last_error = None;
                self.has_more = page.has_more;
                self.last_id = page.last_id;
                self.stats = match page.stats {
                    Some(stats) => ListingStats::from_backend(stats),
                    None => ListingStats::from_page(&page.items),
                };
                self.items = page.items;

                let lookups = self
                    .resolver
                    .plan(self.items.iter().flat_map(|i| i.foreign_refs()));
                for lookup in &lookups {
                    *self.pending_lookups.entry(lookup.kind).or_default() += 1;
                }
                FetchOutcome::Loaded { lookups }
            }
            Err(e) => {
                tracing::warn!(
                    listing = self.domain.name(),
                    page = self.pages.page_number(),
                    "Page fetch failed: {e}"
                );
                self.phase = ListingPhase::Errored;
                self.last_error = Some(e.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Merge the result of a lookup planned by `apply_fetch`.
    /// Returns the number of newly resolved ids.
    pub fn apply_lookup(
        &mut self,
        request: &BatchRequest,
        result: Result<Vec<ResolvedEntity>>,
    ) -> usize {
        if let Some(pending) = self.pending_lookups.get_mut(&request.kind) {
            *pending = pending.saturating_sub(1);
        }
        self.resolver.apply(request, result)
    }

    // ------------------------------------------------------------------
    // Async drivers
    // ------------------------------------------------------------------

    /// Run `request` against `backend`: fetch, apply, then resolve any new
    /// foreign ids with one lookup per kind.
    pub async fn load<B>(&mut self, backend: &B, request: FetchRequest) -> FetchOutcome
    where
        B: ListingBackend + EntityLookup,
    {
        let result = backend
            .fetch_page::<D::Item>(self.domain.endpoint(), &request.query)
            .await;
        let outcome = self.apply_fetch(&request, result);

        if let FetchOutcome::Loaded { lookups } = &outcome
            && !lookups.is_empty()
        {
            let results = run_lookups(lookups, backend).await;
            for (lookup, result) in lookups.iter().zip(results) {
                self.apply_lookup(lookup, result);
            }
        }
        outcome
    }

    /// Fire a mutation, then reload the current page whatever the outcome.
    ///
    /// The mutation's own result is returned so the caller can report it.
    pub async fn mutate<B>(&mut self, backend: &B, mutation: Mutation) -> Result<()>
    where
        B: ListingBackend + EntityLookup + MutationBackend,
    {
        let result = backend.mutate(self.domain.endpoint(), &mutation).await;
        match &result {
            Ok(()) => {
                tracing::debug!(listing = self.domain.name(), "Mutation applied: {mutation}");
                if let Mutation::Delete { id } = &mutation {
                    self.selection.remove(id);
                }
            }
            Err(e) => {
                tracing::warn!(listing = self.domain.name(), "Failed to {mutation}: {e}");
            }
        }

        let request = self.refresh();
        self.load(backend, request).await;
        result
    }
}
