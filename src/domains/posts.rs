//! Post listings

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::listing::domain::{ListingDomain, ListingItem};
use crate::listing::filter::FilterCriteria;
use crate::types::{EntityKind, ForeignRef};

use super::{format_count, format_timestamp, lenient_timestamp, null_as_default};

pub const VALID_POST_STATUSES: &[&str] = &["draft", "scheduled", "published", "archived"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_by_id: Option<String>,
    #[serde(default)]
    pub organisation_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category_ids: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub views: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes: u64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub published_at: Option<Timestamp>,
}

impl ListingItem for Post {
    fn id(&self) -> &str {
        &self.id
    }

    fn foreign_refs(&self) -> Vec<ForeignRef> {
        let mut refs = Vec::with_capacity(self.category_ids.len() + 2);
        if let Some(author) = &self.created_by_id {
            refs.push(ForeignRef::creator(author.clone()));
        }
        if let Some(org) = &self.organisation_id {
            refs.push(ForeignRef::organisation(org.clone()));
        }
        refs.extend(self.category_ids.iter().cloned().map(ForeignRef::category));
        refs
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn views(&self) -> u64 {
        self.views
    }

    fn engagement(&self) -> u64 {
        self.likes
    }
}

/// Adapter for the `posts` collection
#[derive(Debug, Clone, Copy, Default)]
pub struct PostsDomain;

impl ListingDomain for PostsDomain {
    type Item = Post;

    fn name(&self) -> &'static str {
        "posts"
    }

    fn endpoint(&self) -> &str {
        "posts"
    }

    fn filter_params(&self, criteria: &FilterCriteria) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(category) = &criteria.item_type {
            params.push(("category", category.clone()));
        }
        if let Some(min) = criteria.numeric_range.min {
            params.push(("minViews", min.to_string()));
        }
        if let Some(max) = criteria.numeric_range.max {
            params.push(("maxViews", max.to_string()));
        }
        if let Some(start) = criteria.date_range.start {
            params.push(("publishedAfter", start.to_string()));
        }
        if let Some(end) = criteria.date_range.end {
            params.push(("publishedBefore", end.to_string()));
        }
        if criteria.location.is_some() {
            tracing::debug!("posts listing has no location filter; ignoring it");
        }
        params
    }

    fn headers(&self) -> &'static [&'static str] {
        &[
            "ID",
            "Title",
            "Status",
            "Author",
            "Categories",
            "Views",
            "Likes",
            "Published",
        ]
    }

    fn row(&self, post: &Post, name: &dyn Fn(EntityKind, &str) -> String) -> Vec<String> {
        let categories: Vec<String> = post
            .category_ids
            .iter()
            .map(|id| name(EntityKind::Category, id))
            .collect();
        vec![
            post.id.clone(),
            post.title.clone(),
            post.status.clone().unwrap_or_default(),
            post.created_by_id
                .as_deref()
                .map(|id| name(EntityKind::Creator, id))
                .unwrap_or_default(),
            categories.join(", "),
            format_count(post.views),
            format_count(post.likes),
            format_timestamp(post.published_at.as_ref()),
        ]
    }
}
