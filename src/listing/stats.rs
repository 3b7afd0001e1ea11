//! Aggregate counters shown above a listing

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::ListingItem;

/// Where a `ListingStats` value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsSource {
    /// Computed by the backend over the whole filtered collection
    Backend,
    /// Summed over the page on screen; an approximation
    #[default]
    CurrentPage,
}

impl StatsSource {
    pub fn is_approximate(&self) -> bool {
        matches!(self, StatsSource::CurrentPage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub views: u64,
    pub engagement: u64,
    #[serde(skip)]
    pub source: StatsSource,
}

impl ListingStats {
    /// Stats reported by the backend alongside a page
    pub fn from_backend(stats: ListingStats) -> Self {
        Self {
            source: StatsSource::Backend,
            ..stats
        }
    }

    /// Derive stats from the items of the current page only
    pub fn from_page<I: ListingItem>(items: &[I]) -> Self {
        let mut stats = ListingStats {
            total: items.len() as u64,
            source: StatsSource::CurrentPage,
            ..Default::default()
        };
        for item in items {
            if let Some(status) = item.status() {
                *stats.by_status.entry(status.to_string()).or_default() += 1;
            }
            stats.views += item.views();
            stats.engagement += item.engagement();
        }
        stats
    }

    pub fn count(&self, status: &str) -> u64 {
        self.by_status.get(status).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ForeignRef;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Row {
        id: String,
        status: Option<String>,
        views: u64,
    }

    impl ListingItem for Row {
        fn id(&self) -> &str {
            &self.id
        }

        fn foreign_refs(&self) -> Vec<ForeignRef> {
            vec![]
        }

        fn status(&self) -> Option<&str> {
            self.status.as_deref()
        }

        fn views(&self) -> u64 {
            self.views
        }

        fn engagement(&self) -> u64 {
            1
        }
    }

    fn row(id: &str, status: Option<&str>, views: u64) -> Row {
        Row {
            id: id.to_string(),
            status: status.map(str::to_string),
            views,
        }
    }

    #[test]
    fn test_from_page_sums_current_page() {
        let items = vec![
            row("1", Some("published"), 10),
            row("2", Some("draft"), 0),
            row("3", Some("published"), 5),
            row("4", None, 1),
        ];
        let stats = ListingStats::from_page(&items);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.count("published"), 2);
        assert_eq!(stats.count("draft"), 1);
        assert_eq!(stats.count("archived"), 0);
        assert_eq!(stats.views, 16);
        assert_eq!(stats.engagement, 4);
        assert!(stats.source.is_approximate());
    }

    #[test]
    fn test_backend_stats_deserialize_with_missing_fields() {
        let stats: ListingStats =
            serde_json::from_str(r#"{"total":120,"byStatus":{"closed":7}}"#).unwrap();
        let stats = ListingStats::from_backend(stats);
        assert_eq!(stats.total, 120);
        assert_eq!(stats.count("closed"), 7);
        assert_eq!(stats.views, 0);
        assert_eq!(stats.source, StatsSource::Backend);
        assert!(!stats.source.is_approximate());
    }
}
