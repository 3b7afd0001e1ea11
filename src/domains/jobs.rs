//! Job listings

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::listing::domain::{ListingDomain, ListingItem};
use crate::listing::filter::FilterCriteria;
use crate::types::{EntityKind, ForeignRef};

use super::{format_count, format_timestamp, lenient_timestamp, null_as_default};

pub const VALID_JOB_STATUSES: &[&str] = &["draft", "published", "closed", "archived"];
pub const VALID_JOB_TYPES: &[&str] = &[
    "full-time",
    "part-time",
    "contract",
    "freelance",
    "internship",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub organisation_id: Option<String>,
    #[serde(default)]
    pub created_by_id: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary_min: Option<u64>,
    #[serde(default)]
    pub salary_max: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub views: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub applications: u64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<Timestamp>,
}

impl ListingItem for Job {
    fn id(&self) -> &str {
        &self.id
    }

    fn foreign_refs(&self) -> Vec<ForeignRef> {
        let mut refs = Vec::new();
        if let Some(org) = &self.organisation_id {
            refs.push(ForeignRef::organisation(org.clone()));
        }
        if let Some(creator) = &self.created_by_id {
            refs.push(ForeignRef::creator(creator.clone()));
        }
        refs
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn views(&self) -> u64 {
        self.views
    }

    fn engagement(&self) -> u64 {
        self.applications
    }
}

/// Adapter for the `jobs` collection
#[derive(Debug, Clone, Copy, Default)]
pub struct JobsDomain;

impl ListingDomain for JobsDomain {
    type Item = Job;

    fn name(&self) -> &'static str {
        "jobs"
    }

    fn endpoint(&self) -> &str {
        "jobs"
    }

    fn filter_params(&self, criteria: &FilterCriteria) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(kind) = &criteria.item_type {
            params.push(("type", kind.clone()));
        }
        if let Some(location) = &criteria.location {
            params.push(("location", location.clone()));
        }
        if let Some(min) = criteria.numeric_range.min {
            params.push(("salaryMin", min.to_string()));
        }
        if let Some(max) = criteria.numeric_range.max {
            params.push(("salaryMax", max.to_string()));
        }
        if let Some(start) = criteria.date_range.start {
            params.push(("postedAfter", start.to_string()));
        }
        if let Some(end) = criteria.date_range.end {
            params.push(("postedBefore", end.to_string()));
        }
        params
    }

    fn headers(&self) -> &'static [&'static str] {
        &[
            "ID",
            "Title",
            "Status",
            "Organisation",
            "Posted by",
            "Location",
            "Views",
            "Applications",
            "Created",
        ]
    }

    fn row(&self, job: &Job, name: &dyn Fn(EntityKind, &str) -> String) -> Vec<String> {
        vec![
            job.id.clone(),
            job.title.clone(),
            job.status.clone().unwrap_or_default(),
            job.organisation_id
                .as_deref()
                .map(|id| name(EntityKind::Organisation, id))
                .unwrap_or_default(),
            job.created_by_id
                .as_deref()
                .map(|id| name(EntityKind::Creator, id))
                .unwrap_or_default(),
            job.location.clone().unwrap_or_default(),
            format_count(job.views),
            format_count(job.applications),
            format_timestamp(job.created_at.as_ref()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Page;
    use crate::listing::filter::{DateRange, NumericRange};
    use jiff::civil::date;

    #[test]
    fn test_job_deserializes_from_camel_case() {
        let json = r#"{
            "id": "job1",
            "title": "Night editor",
            "status": "published",
            "organisationId": "org1",
            "createdById": "u1",
            "salaryMin": 40000,
            "views": 12,
            "applications": 3,
            "createdAt": "2024-03-01T09:00:00Z"
        }"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.organisation_id.as_deref(), Some("org1"));
        assert_eq!(job.salary_min, Some(40000));
        assert_eq!(job.engagement(), 3);
        assert!(job.created_at.is_some());
    }

    #[test]
    fn test_job_tolerates_nulls_in_display_fields() {
        let json = r#"{
            "items": [
                {
                    "id": "job1",
                    "title": null,
                    "status": null,
                    "views": null,
                    "applications": null,
                    "createdAt": "2024-03-01 09:00"
                },
                { "id": "job2", "title": "Sub-editor", "createdAt": "not a date" }
            ],
            "lastId": "job2",
            "hasMore": true
        }"#;
        let page: Page<Job> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 2);

        let job = &page.items[0];
        assert_eq!(job.title, "");
        assert_eq!(job.views, 0);
        assert_eq!(job.applications, 0);
        assert_eq!(
            job.created_at,
            Some("2024-03-01T09:00:00Z".parse().unwrap())
        );
        assert_eq!(page.items[1].created_at, None);
    }

    #[test]
    fn test_job_foreign_refs() {
        let job = Job {
            id: "job1".to_string(),
            organisation_id: Some("org1".to_string()),
            created_by_id: Some("u1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            job.foreign_refs(),
            vec![ForeignRef::organisation("org1"), ForeignRef::creator("u1")]
        );
        assert!(Job::default().foreign_refs().is_empty());
    }

    #[test]
    fn test_filter_params() {
        let criteria = FilterCriteria::new()
            .with_item_type(Some("contract".to_string()))
            .with_location(Some("Leeds".to_string()))
            .with_numeric_range(NumericRange::new(Some(30000), Some(50000)))
            .with_date_range(DateRange::new(Some(date(2024, 1, 1)), None));

        assert_eq!(
            JobsDomain.filter_params(&criteria),
            vec![
                ("type", "contract".to_string()),
                ("location", "Leeds".to_string()),
                ("salaryMin", "30000".to_string()),
                ("salaryMax", "50000".to_string()),
                ("postedAfter", "2024-01-01".to_string()),
            ]
        );
        assert!(JobsDomain.filter_params(&FilterCriteria::new()).is_empty());
    }

    #[test]
    fn test_row_uses_resolved_names() {
        let job = Job {
            id: "job1".to_string(),
            title: "Reporter".to_string(),
            organisation_id: Some("org1".to_string()),
            views: 1500,
            ..Default::default()
        };
        let row = JobsDomain.row(&job, &|kind, id| format!("{kind}:{id}"));
        assert_eq!(row.len(), JobsDomain.headers().len());
        assert_eq!(row[3], "organisation:org1");
        assert_eq!(row[4], "");
        assert_eq!(row[6], "1,500");
    }
}
