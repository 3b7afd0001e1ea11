use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use newsdesk::backend::{EntityLookup, ListingBackend, Mutation, MutationBackend, Page, PageQuery};
use newsdesk::error::{NewsdeskError, Result};
use newsdesk::types::{EntityKind, ResolvedEntity};

/// In-memory content API.
///
/// Pages are keyed by the `startAfter` cursor they answer. Every call is
/// recorded so tests can assert on what the engine asked for.
#[derive(Default)]
pub struct MockBackend {
    pages: Mutex<HashMap<Option<String>, Value>>,
    names: Mutex<HashMap<(EntityKind, String), String>>,
    failing_cursors: Mutex<HashSet<Option<String>>>,
    failing_kinds: Mutex<HashSet<EntityKind>>,
    fail_mutations: Mutex<bool>,
    fetches: Mutex<Vec<PageQuery>>,
    lookups: Mutex<Vec<(EntityKind, Vec<String>)>>,
    mutations: Mutex<Vec<(String, Mutation)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `items` for requests starting after `cursor`
    pub fn with_page(
        self,
        cursor: Option<&str>,
        items: Vec<Value>,
        last_id: Option<&str>,
        has_more: bool,
    ) -> Self {
        let page = json!({
            "items": items,
            "lastId": last_id,
            "hasMore": has_more,
        });
        self.pages.lock().insert(cursor.map(str::to_string), page);
        self
    }

    /// Attach backend-computed stats to an already registered page
    pub fn with_stats(self, cursor: Option<&str>, stats: Value) -> Self {
        if let Some(page) = self.pages.lock().get_mut(&cursor.map(str::to_string)) {
            page["stats"] = stats;
        }
        self
    }

    pub fn with_name(self, kind: EntityKind, id: &str, name: &str) -> Self {
        self.names
            .lock()
            .insert((kind, id.to_string()), name.to_string());
        self
    }

    /// The next fetch for `cursor` fails once
    pub fn fail_once(&self, cursor: Option<&str>) {
        self.failing_cursors.lock().insert(cursor.map(str::to_string));
    }

    /// Every lookup for `kind` fails
    pub fn fail_lookups(&self, kind: EntityKind) {
        self.failing_kinds.lock().insert(kind);
    }

    pub fn fail_mutations(&self) {
        *self.fail_mutations.lock() = true;
    }

    pub fn fetches(&self) -> Vec<PageQuery> {
        self.fetches.lock().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().len()
    }

    pub fn lookups(&self) -> Vec<(EntityKind, Vec<String>)> {
        self.lookups.lock().clone()
    }

    pub fn lookups_for(&self, kind: EntityKind) -> Vec<Vec<String>> {
        self.lookups
            .lock()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, ids)| ids.clone())
            .collect()
    }

    pub fn mutations(&self) -> Vec<(String, Mutation)> {
        self.mutations.lock().clone()
    }
}

impl ListingBackend for MockBackend {
    fn fetch_page<I>(
        &self,
        _endpoint: &str,
        query: &PageQuery,
    ) -> impl std::future::Future<Output = Result<Page<I>>> + Send
    where
        I: DeserializeOwned + Send,
    {
        async move {
            self.fetches.lock().push(query.clone());
            let cursor = query.start_after.as_ref().map(|c| c.as_str().to_string());

            if self.failing_cursors.lock().remove(&cursor) {
                return Err(NewsdeskError::Api("service unavailable (503)".to_string()));
            }

            let page = self.pages.lock().get(&cursor).cloned();
            match page {
                Some(value) => Ok(serde_json::from_value::<Page<I>>(value)?),
                None => Ok(Page::empty()),
            }
        }
    }
}

impl EntityLookup for MockBackend {
    fn lookup(
        &self,
        kind: EntityKind,
        ids: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<ResolvedEntity>>> + Send {
        async move {
            self.lookups.lock().push((kind, ids.to_vec()));
            if self.failing_kinds.lock().contains(&kind) {
                return Err(NewsdeskError::Api(format!("{kind} lookup failed (500)")));
            }
            let names = self.names.lock();
            Ok(ids
                .iter()
                .filter_map(|id| {
                    names
                        .get(&(kind, id.clone()))
                        .map(|name| ResolvedEntity::new(id.clone(), name.clone()))
                })
                .collect())
        }
    }
}

impl MutationBackend for MockBackend {
    fn mutate(
        &self,
        endpoint: &str,
        mutation: &Mutation,
    ) -> impl std::future::Future<Output = Result<()>> + Send {
        async move {
            self.mutations
                .lock()
                .push((endpoint.to_string(), mutation.clone()));
            if *self.fail_mutations.lock() {
                return Err(NewsdeskError::Api(format!("cannot {mutation} (409)")));
            }
            Ok(())
        }
    }
}

pub fn job_json(id: &str, org: Option<&str>, creator: Option<&str>) -> Value {
    json!({
        "id": id,
        "title": format!("Job {id}"),
        "status": "published",
        "organisationId": org,
        "createdById": creator,
        "views": 10,
        "applications": 2,
    })
}

pub fn post_json(id: &str, author: &str, categories: &[&str]) -> Value {
    json!({
        "id": id,
        "title": format!("Post {id}"),
        "status": "draft",
        "createdById": author,
        "categoryIds": categories,
        "views": 5,
        "likes": 1,
    })
}
