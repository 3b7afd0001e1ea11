use owo_colors::OwoColorize;

use crate::backend::{EntityLookup, ListingBackend, Mutation, MutationBackend};
use crate::display::render_listing;
use crate::domains::{JobsDomain, PostsDomain};
use crate::error::{NewsdeskError, Result};
use crate::listing::{FilterCriteria, ListingDomain, ListingEngine};

use super::{Collection, connect, engine_for, validate_choice};

/// Run each mutation through the engine, printing a notice per outcome.
///
/// The listing is refreshed after every mutation whether it succeeded or not.
/// Returns the number of failures.
pub(crate) async fn apply_mutations<D, B>(
    engine: &mut ListingEngine<D>,
    backend: &B,
    mutations: Vec<Mutation>,
) -> usize
where
    D: ListingDomain,
    B: ListingBackend + EntityLookup + MutationBackend,
{
    let mut failures = 0;
    for mutation in mutations {
        let label = mutation.to_string();
        match engine.mutate(backend, mutation).await {
            Ok(()) => println!("{} {}", "Done:".green(), label),
            Err(e) => {
                failures += 1;
                eprintln!("{} failed to {label}: {e}", "Error:".red().bold());
            }
        }
    }
    failures
}

async fn run<D: ListingDomain>(domain: D, mutations: Vec<Mutation>) -> Result<()> {
    let (config, backend) = connect()?;
    let mut engine = engine_for(domain, &config, None, FilterCriteria::new());
    let total = mutations.len();
    let failures = apply_mutations(&mut engine, &backend, mutations).await;

    println!("\n{}", render_listing(&engine, false));
    if failures > 0 {
        return Err(NewsdeskError::Other(format!(
            "{failures} of {total} operation(s) failed"
        )));
    }
    Ok(())
}

async fn dispatch(collection: Collection, mutations: Vec<Mutation>) -> Result<()> {
    match collection {
        Collection::Jobs => run(JobsDomain, mutations).await,
        Collection::Posts => run(PostsDomain, mutations).await,
    }
}

pub async fn cmd_delete(collection: Collection, ids: &[String]) -> Result<()> {
    let mutations = ids
        .iter()
        .map(|id| Mutation::Delete { id: id.clone() })
        .collect();
    dispatch(collection, mutations).await
}

pub async fn cmd_duplicate(collection: Collection, id: &str) -> Result<()> {
    dispatch(collection, vec![Mutation::Duplicate { id: id.to_string() }]).await
}

pub async fn cmd_set_status(collection: Collection, id: &str, status: &str) -> Result<()> {
    validate_choice("status", status, collection.valid_statuses())?;
    let mutation = Mutation::SetStatus {
        id: id.to_string(),
        status: status.to_string(),
    };
    dispatch(collection, vec![mutation]).await
}
