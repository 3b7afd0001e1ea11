//! Seams between the generic listing engine and a concrete collection

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::{EntityKind, ForeignRef};

use super::filter::FilterCriteria;

/// A record shown in a listing. Treated as immutable once fetched.
pub trait ListingItem: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    fn id(&self) -> &str;

    /// Every foreign-key reference carried by this item
    fn foreign_refs(&self) -> Vec<ForeignRef>;

    fn status(&self) -> Option<&str> {
        None
    }

    fn views(&self) -> u64 {
        0
    }

    fn engagement(&self) -> u64 {
        0
    }
}

/// Configuration that turns the generic engine into a concrete listing
pub trait ListingDomain: Send + Sync {
    type Item: ListingItem;

    /// Human-readable collection name ("jobs", "posts")
    fn name(&self) -> &'static str;

    /// Path segment of the listing endpoint, relative to the API base URL
    fn endpoint(&self) -> &str;

    /// Query parameters specific to this collection.
    ///
    /// The engine adds `limit`, `startAfter`, `search`, `status`, `sort` and
    /// `createdBy` itself.
    fn filter_params(&self, criteria: &FilterCriteria) -> Vec<(&'static str, String)>;

    /// Column headers for tabular output
    fn headers(&self) -> &'static [&'static str];

    /// Cells for one item, using `name` to render foreign references
    fn row(&self, item: &Self::Item, name: &dyn Fn(EntityKind, &str) -> String) -> Vec<String>;
}
