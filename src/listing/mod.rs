//! Generic paginated listing: filters, cursor pages, name resolution and
//! the engine that drives them.

pub mod debounce;
pub mod domain;
pub mod engine;
pub mod filter;
pub mod pagination;
pub mod resolve;
pub mod stats;

pub use debounce::{CancellableTimer, DebouncedSearch, SEARCH_DEBOUNCE};
pub use domain::{ListingDomain, ListingItem};
pub use engine::{EngineOptions, FetchOutcome, FetchRequest, ListingEngine, ListingPhase};
pub use filter::{DateRange, FilterCriteria, FilterState, NumericRange, ScopeTab, SortKey};
pub use pagination::PageStack;
pub use resolve::{BatchRequest, BatchResolver, ResolutionCache, run_lookups};
pub use stats::{ListingStats, StatsSource};
