use std::collections::BTreeMap;

use serde::Serialize;

use crate::backend::{EntityLookup, ListingBackend};
use crate::cli::FilterArgs;
use crate::display::render_listing;
use crate::domains::{JobsDomain, PostsDomain};
use crate::error::{NewsdeskError, Result};
use crate::listing::{FetchOutcome, ListingDomain, ListingEngine, ListingItem, ListingStats};

use super::{Collection, connect, engine_for};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageOutput<'a, I> {
    listing: &'a str,
    page: usize,
    has_more: bool,
    items: &'a [I],
    /// Resolved display names by entity kind, then id
    names: BTreeMap<String, BTreeMap<String, String>>,
    stats: &'a ListingStats,
    stats_approximate: bool,
}

fn ensure_loaded<D: ListingDomain>(
    engine: &ListingEngine<D>,
    outcome: FetchOutcome,
) -> Result<()> {
    match outcome {
        FetchOutcome::Loaded { .. } => Ok(()),
        FetchOutcome::Failed => Err(NewsdeskError::Other(format!(
            "failed to load {} page {}: {}",
            engine.domain().name(),
            engine.page_number(),
            engine.last_error().unwrap_or("unknown error")
        ))),
        FetchOutcome::Stale => Err(NewsdeskError::Other(
            "page response was superseded".to_string(),
        )),
    }
}

/// Load the first page, then follow cursors until `page` is on screen.
///
/// Stops early on the last page. Returns the page number reached.
pub async fn walk_to_page<D, B>(
    engine: &mut ListingEngine<D>,
    backend: &B,
    page: usize,
) -> Result<usize>
where
    D: ListingDomain,
    B: ListingBackend + EntityLookup,
{
    let request = engine.start();
    let outcome = engine.load(backend, request).await;
    ensure_loaded(engine, outcome)?;

    while engine.page_number() < page {
        let Some(request) = engine.next_page() else {
            break;
        };
        let outcome = engine.load(backend, request).await;
        ensure_loaded(engine, outcome)?;
    }
    Ok(engine.page_number())
}

fn resolved_names<D: ListingDomain>(
    engine: &ListingEngine<D>,
) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut names: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for r in engine.items().iter().flat_map(|i| i.foreign_refs()) {
        if let Some(name) = engine.resolver().display_name(r.kind, &r.id) {
            names
                .entry(r.kind.to_string())
                .or_default()
                .insert(r.id.clone(), name.to_string());
        }
    }
    names
}

async fn ls<D: ListingDomain>(
    domain: D,
    filters: &FilterArgs,
    page: usize,
    limit: Option<u32>,
    json: bool,
    collection: Collection,
) -> Result<()> {
    let criteria = filters.to_criteria().map_err(NewsdeskError::Other)?;
    collection.validate(&criteria)?;

    let (config, backend) = connect()?;
    let mut engine = engine_for(domain, &config, limit, criteria);
    let reached = walk_to_page(&mut engine, &backend, page).await?;
    if reached < page {
        eprintln!(
            "{} has only {reached} page(s); showing page {reached}",
            engine.domain().name()
        );
    }

    if json {
        let output = PageOutput {
            listing: engine.domain().name(),
            page: reached,
            has_more: engine.has_more(),
            items: engine.items(),
            names: resolved_names(&engine),
            stats: engine.stats(),
            stats_approximate: engine.stats().source.is_approximate(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", render_listing(&engine, false));
    Ok(())
}

/// Print one page of a collection
pub async fn cmd_ls(
    collection: Collection,
    filters: &FilterArgs,
    page: u32,
    limit: Option<u32>,
    json: bool,
) -> Result<()> {
    let page = page as usize;
    match collection {
        Collection::Jobs => ls(JobsDomain, filters, page, limit, json, collection).await,
        Collection::Posts => ls(PostsDomain, filters, page, limit, json, collection).await,
    }
}
