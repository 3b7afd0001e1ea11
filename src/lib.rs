pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod domains;
pub mod error;
pub mod listing;
pub mod types;

#[cfg(test)]
pub(crate) mod test_guards;

pub use backend::{
    EntityLookup, HttpBackend, ListingBackend, Mutation, MutationBackend, Page, PageQuery,
};
pub use config::Config;
pub use domains::{Job, JobsDomain, Post, PostsDomain};
pub use error::{NewsdeskError, Result};
pub use listing::{
    EngineOptions, FetchOutcome, FetchRequest, FilterCriteria, ListingDomain, ListingEngine,
    ListingItem, ListingPhase, ListingStats,
};
pub use types::{Cursor, EntityKind, ForeignRef, ResolvedEntity};
