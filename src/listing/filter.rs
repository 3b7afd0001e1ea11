//! Filter and sort state for a listing
//!
//! `FilterCriteria` is an immutable value: every change produces a new value,
//! and two values compare equal exactly when they describe the same query.
//! `FilterState` owns the current value and notifies subscribers when it
//! actually changes.

use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::NewsdeskError;

/// Sort order understood by the listing endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Title,
    Views,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Title => "title",
            SortKey::Views => "views",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = NewsdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            "title" => Ok(SortKey::Title),
            "views" => Ok(SortKey::Views),
            _ => Err(NewsdeskError::InvalidValue("sort key", s.to_string())),
        }
    }
}

pub const VALID_SORT_KEYS: &[&str] = &["newest", "oldest", "title", "views"];

/// Which slice of the collection the listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeTab {
    #[default]
    All,
    /// Only items created by the current viewer
    Mine,
}

impl ScopeTab {
    pub fn toggle(self) -> Self {
        match self {
            ScopeTab::All => ScopeTab::Mine,
            ScopeTab::Mine => ScopeTab::All,
        }
    }
}

impl fmt::Display for ScopeTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeTab::All => write!(f, "all"),
            ScopeTab::Mine => write!(f, "mine"),
        }
    }
}

impl FromStr for ScopeTab {
    type Err = NewsdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ScopeTab::All),
            "mine" => Ok(ScopeTab::Mine),
            _ => Err(NewsdeskError::InvalidValue("scope", s.to_string())),
        }
    }
}

/// Inclusive numeric bounds; either side may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl NumericRange {
    pub fn new(min: Option<u64>, max: Option<u64>) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Inclusive calendar-date bounds; either side may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl DateRange {
    pub fn new(start: Option<Date>, end: Option<Date>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// The complete query shape of a listing, minus the pagination cursor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub search_text: String,
    pub status: Option<String>,
    pub item_type: Option<String>,
    pub location: Option<String>,
    pub numeric_range: NumericRange,
    pub date_range: DateRange,
    pub sort: SortKey,
    pub scope: ScopeTab,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_text(self, text: impl Into<String>) -> Self {
        Self {
            search_text: text.into(),
            ..self
        }
    }

    pub fn with_status(self, status: Option<String>) -> Self {
        Self { status, ..self }
    }

    pub fn with_item_type(self, item_type: Option<String>) -> Self {
        Self { item_type, ..self }
    }

    pub fn with_location(self, location: Option<String>) -> Self {
        Self { location, ..self }
    }

    pub fn with_numeric_range(self, numeric_range: NumericRange) -> Self {
        Self {
            numeric_range,
            ..self
        }
    }

    pub fn with_date_range(self, date_range: DateRange) -> Self {
        Self { date_range, ..self }
    }

    pub fn with_sort(self, sort: SortKey) -> Self {
        Self { sort, ..self }
    }

    pub fn with_scope(self, scope: ScopeTab) -> Self {
        Self { scope, ..self }
    }

    /// Trimmed search text, or `None` when there is nothing to search for
    pub fn search(&self) -> Option<&str> {
        let text = self.search_text.trim();
        if text.is_empty() { None } else { Some(text) }
    }

    /// True when no narrowing filter is active (sort and scope aside)
    pub fn is_unfiltered(&self) -> bool {
        self.search().is_none()
            && self.status.is_none()
            && self.item_type.is_none()
            && self.location.is_none()
            && self.numeric_range.is_unbounded()
            && self.date_range.is_unbounded()
    }
}

/// Holder of the current `FilterCriteria`.
///
/// Every setter replaces the whole value. Subscribers are only notified when
/// the new value differs from the old one.
#[derive(Debug)]
pub struct FilterState {
    current: FilterCriteria,
    revision: u64,
    notifier: watch::Sender<FilterCriteria>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(FilterCriteria::default())
    }
}

impl FilterState {
    pub fn new(initial: FilterCriteria) -> Self {
        let (notifier, _) = watch::channel(initial.clone());
        Self {
            current: initial,
            revision: 0,
            notifier,
        }
    }

    pub fn current(&self) -> &FilterCriteria {
        &self.current
    }

    /// Number of effective changes since creation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&self) -> watch::Receiver<FilterCriteria> {
        self.notifier.subscribe()
    }

    /// Replace the criteria. Returns `true` if the value changed.
    pub fn replace(&mut self, criteria: FilterCriteria) -> bool {
        if criteria == self.current {
            return false;
        }
        self.current = criteria;
        self.revision += 1;
        self.notifier.send_replace(self.current.clone());
        true
    }

    /// Derive new criteria from the current value and replace
    pub fn update(&mut self, f: impl FnOnce(FilterCriteria) -> FilterCriteria) -> bool {
        let next = f(self.current.clone());
        self.replace(next)
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.update(|c| c.with_search_text(text))
    }

    pub fn set_status(&mut self, status: Option<String>) -> bool {
        self.update(|c| c.with_status(status))
    }

    pub fn set_item_type(&mut self, item_type: Option<String>) -> bool {
        self.update(|c| c.with_item_type(item_type))
    }

    pub fn set_location(&mut self, location: Option<String>) -> bool {
        self.update(|c| c.with_location(location))
    }

    pub fn set_numeric_range(&mut self, range: NumericRange) -> bool {
        self.update(|c| c.with_numeric_range(range))
    }

    pub fn set_date_range(&mut self, range: DateRange) -> bool {
        self.update(|c| c.with_date_range(range))
    }

    pub fn set_sort(&mut self, sort: SortKey) -> bool {
        self.update(|c| c.with_sort(sort))
    }

    pub fn set_scope(&mut self, scope: ScopeTab) -> bool {
        self.update(|c| c.with_scope(scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("Newest".parse::<SortKey>().unwrap(), SortKey::Newest);
        assert_eq!("views".parse::<SortKey>().unwrap(), SortKey::Views);
        assert!("popularity".parse::<SortKey>().is_err());
        for key in VALID_SORT_KEYS {
            assert_eq!(key.parse::<SortKey>().unwrap().as_str(), *key);
        }
    }

    #[test]
    fn test_search_ignores_surrounding_whitespace() {
        let criteria = FilterCriteria::new().with_search_text("  editor ");
        assert_eq!(criteria.search(), Some("editor"));
        assert_eq!(FilterCriteria::new().with_search_text("   ").search(), None);
    }

    #[test]
    fn test_is_unfiltered() {
        assert!(FilterCriteria::new().with_sort(SortKey::Title).is_unfiltered());
        assert!(
            !FilterCriteria::new()
                .with_numeric_range(NumericRange::new(Some(10), None))
                .is_unfiltered()
        );
    }

    #[test]
    fn test_setting_equal_value_is_not_a_change() {
        let mut state = FilterState::default();
        assert!(!state.set_sort(SortKey::Newest));
        assert!(!state.set_search_text(""));
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn test_setters_replace_whole_value() {
        let mut state = FilterState::default();
        assert!(state.set_status(Some("published".to_string())));
        assert!(state.set_scope(ScopeTab::Mine));

        let current = state.current();
        assert_eq!(current.status.as_deref(), Some("published"));
        assert_eq!(current.scope, ScopeTab::Mine);
        assert_eq!(state.revision(), 2);
    }

    #[test]
    fn test_subscribers_see_latest_value() {
        let mut state = FilterState::default();
        let mut rx = state.subscribe();
        assert!(!rx.has_changed().unwrap());

        state.set_location(Some("Berlin".to_string()));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().location.as_deref(), Some("Berlin"));

        state.set_location(Some("Berlin".to_string()));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_scope_toggle() {
        assert_eq!(ScopeTab::All.toggle(), ScopeTab::Mine);
        assert_eq!(ScopeTab::Mine.toggle(), ScopeTab::All);
    }
}
