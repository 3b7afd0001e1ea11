//! Backend contracts consumed by the listing engine.
//!
//! The engine only talks to the content API through these traits; the HTTP
//! implementation lives in [`http`], and tests substitute in-memory doubles.

pub mod error;
pub mod http;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::listing::stats::ListingStats;
use crate::types::{Cursor, EntityKind, ResolvedEntity};

pub use http::HttpBackend;

/// Parameters of one page request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: u32,
    pub start_after: Option<Cursor>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort: String,
    pub created_by: Option<String>,
    /// Collection-specific filters, in the order the adapter produced them
    pub filters: Vec<(&'static str, String)>,
}

impl PageQuery {
    /// Query-string pairs, omitting absent values
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.limit.to_string())];
        if let Some(cursor) = &self.start_after {
            pairs.push(("startAfter", cursor.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        pairs.push(("sort", self.sort.clone()));
        pairs.extend(self.filters.iter().cloned());
        if let Some(created_by) = &self.created_by {
            pairs.push(("createdBy", created_by.clone()));
        }
        pairs
    }
}

/// One page of a listing as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<I> {
    pub items: Vec<I>,
    #[serde(default)]
    pub last_id: Option<Cursor>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub stats: Option<ListingStats>,
}

impl<I> Page<I> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            last_id: None,
            has_more: false,
            stats: None,
        }
    }
}

/// Write operations on single items. Not part of paging; the engine refreshes
/// the current page after any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Delete { id: String },
    Duplicate { id: String },
    SetStatus { id: String, status: String },
}

impl Mutation {
    pub fn id(&self) -> &str {
        match self {
            Mutation::Delete { id } | Mutation::Duplicate { id } => id,
            Mutation::SetStatus { id, .. } => id,
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Delete { id } => write!(f, "delete {id}"),
            Mutation::Duplicate { id } => write!(f, "duplicate {id}"),
            Mutation::SetStatus { id, status } => write!(f, "set status of {id} to {status}"),
        }
    }
}

/// Source of listing pages
pub trait ListingBackend: Send + Sync {
    fn fetch_page<I>(
        &self,
        endpoint: &str,
        query: &PageQuery,
    ) -> impl std::future::Future<Output = Result<Page<I>>> + Send
    where
        I: DeserializeOwned + Send;
}

/// Batched id → display name resolution for one entity kind per call.
///
/// Ids missing from the response are simply unresolved, not an error.
pub trait EntityLookup: Send + Sync {
    fn lookup(
        &self,
        kind: EntityKind,
        ids: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<ResolvedEntity>>> + Send;
}

/// Item mutations, treated as black boxes
pub trait MutationBackend: Send + Sync {
    fn mutate(
        &self,
        endpoint: &str,
        mutation: &Mutation,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
