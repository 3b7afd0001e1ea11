//! Interactive, line-driven browsing of a listing.
//!
//! Each line on stdin is one command. Search text typed with `/` goes through
//! the debouncer, so several quick edits cost a single fetch. Fetches run in
//! the background and are applied as they complete.

use std::str::FromStr;
use std::sync::Arc;

use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use crate::backend::{EntityLookup, ListingBackend, Mutation, MutationBackend, Page};
use crate::cli::FilterArgs;
use crate::display::render_listing;
use crate::domains::{JobsDomain, PostsDomain};
use crate::error::{NewsdeskError, Result};
use crate::listing::{
    BatchRequest, DebouncedSearch, FetchOutcome, FetchRequest, FilterCriteria, ListingDomain,
    ListingEngine, ListingPhase, SortKey, run_lookups,
};
use crate::types::ResolvedEntity;

use super::mutate::apply_mutations;
use super::{Collection, connect, engine_for, validate_choice};

const HELP: &str = "\
Commands:
  n                  next page
  p                  previous page
  r                  retry a failed load, or refresh
  /<text>            search (a lone / clears it)
  s [status]         filter by status (no argument clears)
  t [type]           filter by type or category (no argument clears)
  o <sort>           sort by newest, oldest, title or views
  m                  toggle between all items and mine
  x <id>             toggle selection of an item
  a                  select every item on the page
  c                  clear the selection
  d                  delete the selected items
  dup <id>           duplicate an item
  set <id> <status>  change the status of an item
  ?                  show this help
  q                  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Redraw,
    Next,
    Previous,
    Retry,
    Search(String),
    Status(Option<String>),
    Type(Option<String>),
    Sort(SortKey),
    ToggleScope,
    Toggle(String),
    SelectAll,
    ClearSelection,
    DeleteSelected,
    Duplicate(String),
    SetStatus { id: String, status: String },
    Help,
    Quit,
}

fn optional_arg(arg: &str) -> Option<String> {
    let arg = arg.trim();
    (!arg.is_empty()).then(|| arg.to_string())
}

pub fn parse_browse_command(line: &str) -> std::result::Result<BrowseCommand, String> {
    let line = line.trim();
    if let Some(text) = line.strip_prefix('/') {
        return Ok(BrowseCommand::Search(text.to_string()));
    }

    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let need_id = |name: &str| {
        optional_arg(rest).ok_or_else(|| format!("'{name}' needs an item id"))
    };

    match head {
        "" => Ok(BrowseCommand::Redraw),
        "n" => Ok(BrowseCommand::Next),
        "p" => Ok(BrowseCommand::Previous),
        "r" => Ok(BrowseCommand::Retry),
        "s" => Ok(BrowseCommand::Status(optional_arg(rest))),
        "t" => Ok(BrowseCommand::Type(optional_arg(rest))),
        "o" => SortKey::from_str(rest)
            .map(BrowseCommand::Sort)
            .map_err(|e| e.to_string()),
        "m" => Ok(BrowseCommand::ToggleScope),
        "x" => need_id("x").map(BrowseCommand::Toggle),
        "a" => Ok(BrowseCommand::SelectAll),
        "c" => Ok(BrowseCommand::ClearSelection),
        "d" => Ok(BrowseCommand::DeleteSelected),
        "dup" => need_id("dup").map(BrowseCommand::Duplicate),
        "set" => match rest.split_once(' ') {
            Some((id, status)) if !status.trim().is_empty() => Ok(BrowseCommand::SetStatus {
                id: id.to_string(),
                status: status.trim().to_string(),
            }),
            _ => Err("usage: set <id> <status>".to_string()),
        },
        "?" | "h" | "help" => Ok(BrowseCommand::Help),
        "q" | "quit" | "exit" => Ok(BrowseCommand::Quit),
        other => Err(format!("unknown command '{other}' (? for help)")),
    }
}

fn describe_filters(criteria: &FilterCriteria) -> String {
    let mut parts = vec![format!("scope {}", criteria.scope), format!("sort {}", criteria.sort)];
    if let Some(search) = criteria.search() {
        parts.push(format!("search \"{search}\""));
    }
    if let Some(status) = &criteria.status {
        parts.push(format!("status {status}"));
    }
    if let Some(item_type) = &criteria.item_type {
        parts.push(format!("type {item_type}"));
    }
    parts.join(" · ")
}

fn redraw<D: ListingDomain>(engine: &ListingEngine<D>) {
    println!(
        "\n{} {} · {}",
        "▸".cyan(),
        engine.domain().name().bold(),
        describe_filters(engine.criteria())
    );
    println!("{}", render_listing(engine, true));
}

/// Finished background work, fed back into the engine
enum BrowseEvent<I> {
    Page {
        request: FetchRequest,
        result: Result<Page<I>>,
    },
    Names {
        requests: Vec<BatchRequest>,
        results: Vec<Result<Vec<ResolvedEntity>>>,
    },
}

/// State of one interactive session.
///
/// Page fetches and name lookups run as spawned tasks, so a command typed
/// while a response is outstanding takes effect at once. Responses that were
/// superseded in the meantime are dropped by the engine.
struct Session<D: ListingDomain, B> {
    engine: ListingEngine<D>,
    backend: Arc<B>,
    search: DebouncedSearch,
    tasks: JoinSet<BrowseEvent<D::Item>>,
    collection: Collection,
}

impl<D, B> Session<D, B>
where
    D: ListingDomain + 'static,
    B: ListingBackend + EntityLookup + MutationBackend + 'static,
{
    fn new(
        engine: ListingEngine<D>,
        backend: Arc<B>,
        search: DebouncedSearch,
        collection: Collection,
    ) -> Self {
        Self {
            engine,
            backend,
            search,
            tasks: JoinSet::new(),
            collection,
        }
    }

    fn begin(&mut self) {
        let request = self.engine.start();
        self.spawn_fetch(request);
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        let backend = Arc::clone(&self.backend);
        let endpoint = self.engine.domain().endpoint().to_string();
        self.tasks.spawn(async move {
            let result = backend
                .fetch_page::<D::Item>(&endpoint, &request.query)
                .await;
            BrowseEvent::Page { request, result }
        });
    }

    fn spawn_lookups(&mut self, requests: Vec<BatchRequest>) {
        if requests.is_empty() {
            return;
        }
        let backend = Arc::clone(&self.backend);
        self.tasks.spawn(async move {
            let results = run_lookups(&requests, backend.as_ref()).await;
            BrowseEvent::Names { requests, results }
        });
    }

    fn dispatch(&mut self, request: Option<FetchRequest>, hint: &str) {
        match request {
            Some(request) => {
                println!(
                    "{}",
                    format!("Loading page {}…", self.engine.page_number()).dimmed()
                );
                self.spawn_fetch(request);
            }
            None if !hint.is_empty() => println!("{}", hint.dimmed()),
            None => {}
        }
    }

    /// Apply a finished task. Returns the outcome for page responses.
    fn handle(&mut self, event: BrowseEvent<D::Item>) -> Option<FetchOutcome> {
        match event {
            BrowseEvent::Page { request, result } => {
                let outcome = self.engine.apply_fetch(&request, result);
                match &outcome {
                    FetchOutcome::Loaded { lookups } => {
                        self.spawn_lookups(lookups.clone());
                        redraw(&self.engine);
                    }
                    FetchOutcome::Failed => redraw(&self.engine),
                    FetchOutcome::Stale => {}
                }
                Some(outcome)
            }
            BrowseEvent::Names { requests, results } => {
                for (request, result) in requests.iter().zip(results) {
                    self.engine.apply_lookup(request, result);
                }
                if self.engine.phase() != ListingPhase::Loading {
                    redraw(&self.engine);
                }
                None
            }
        }
    }

    /// Apply one command. Returns `false` when the user asked to quit.
    async fn step(&mut self, command: BrowseCommand) -> bool {
        match command {
            BrowseCommand::Redraw => redraw(&self.engine),
            BrowseCommand::Next => {
                let request = self.engine.next_page();
                self.dispatch(request, "No next page.");
            }
            BrowseCommand::Previous => {
                let request = self.engine.previous_page();
                self.dispatch(request, "Already on the first page.");
            }
            BrowseCommand::Retry => {
                let request = self
                    .engine
                    .retry()
                    .unwrap_or_else(|| self.engine.refresh());
                self.dispatch(Some(request), "");
            }
            BrowseCommand::Search(text) => self.search.input(text),
            BrowseCommand::Status(status) => {
                if let Some(s) = &status
                    && let Err(e) = validate_choice("status", s, self.collection.valid_statuses())
                {
                    eprintln!("{} {e}", "Error:".red().bold());
                    return true;
                }
                let request = self.engine.update_filters(|c| c.with_status(status));
                self.dispatch(request, "Filters unchanged.");
            }
            BrowseCommand::Type(item_type) => {
                if let (Some(t), Some(valid)) = (&item_type, self.collection.valid_types())
                    && let Err(e) = validate_choice("type", t, valid)
                {
                    eprintln!("{} {e}", "Error:".red().bold());
                    return true;
                }
                let request = self.engine.update_filters(|c| c.with_item_type(item_type));
                self.dispatch(request, "Filters unchanged.");
            }
            BrowseCommand::Sort(sort) => {
                let request = self.engine.update_filters(|c| c.with_sort(sort));
                self.dispatch(request, "Sort unchanged.");
            }
            BrowseCommand::ToggleScope => {
                let request = self.engine.update_filters(|c| {
                    let scope = c.scope.toggle();
                    c.with_scope(scope)
                });
                self.dispatch(request, "");
            }
            BrowseCommand::Toggle(id) => {
                if self.engine.item(&id).is_none() {
                    eprintln!("{} no item '{id}' on this page", "Error:".red().bold());
                    return true;
                }
                self.engine.toggle_selection(&id);
                redraw(&self.engine);
            }
            BrowseCommand::SelectAll => {
                self.engine.select_all();
                redraw(&self.engine);
            }
            BrowseCommand::ClearSelection => {
                self.engine.clear_selection();
                redraw(&self.engine);
            }
            BrowseCommand::DeleteSelected => {
                if self.engine.selection().is_empty() {
                    println!("{}", "Nothing selected.".dimmed());
                    return true;
                }
                let mutations = self
                    .engine
                    .selection()
                    .iter()
                    .map(|id| Mutation::Delete { id: id.clone() })
                    .collect();
                self.mutate(mutations).await;
            }
            BrowseCommand::Duplicate(id) => {
                self.mutate(vec![Mutation::Duplicate { id }]).await;
            }
            BrowseCommand::SetStatus { id, status } => {
                if let Err(e) =
                    validate_choice("status", &status, self.collection.valid_statuses())
                {
                    eprintln!("{} {e}", "Error:".red().bold());
                    return true;
                }
                self.mutate(vec![Mutation::SetStatus { id, status }]).await;
            }
            BrowseCommand::Help => println!("{HELP}"),
            BrowseCommand::Quit => return false,
        }
        true
    }

    /// Mutations run inline; their refresh supersedes any fetch still in flight
    async fn mutate(&mut self, mutations: Vec<Mutation>) {
        apply_mutations(&mut self.engine, self.backend.as_ref(), mutations).await;
        redraw(&self.engine);
    }
}

async fn browse<D: ListingDomain + 'static>(
    domain: D,
    filters: &FilterArgs,
    limit: Option<u32>,
    collection: Collection,
) -> Result<()> {
    let criteria = filters.to_criteria().map_err(NewsdeskError::Other)?;
    collection.validate(&criteria)?;

    let (config, backend) = connect()?;
    let engine = engine_for(domain, &config, limit, criteria);
    let (search, mut committed) = DebouncedSearch::new(config.search_debounce());
    let mut filter_changes = engine.filters().subscribe();
    let mut session = Session::new(engine, Arc::new(backend), search, collection);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    session.begin();
    println!("{}", "Loading… type ? for help.".dimmed());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_browse_command(&line) {
                    Ok(command) => {
                        if !session.step(command).await {
                            break;
                        }
                    }
                    Err(msg) => eprintln!("{} {msg}", "Error:".red().bold()),
                }
            }
            Some(text) = committed.recv() => {
                let request = session.engine.set_search_text(text);
                session.dispatch(request, "Search unchanged.");
            }
            Some(joined) = session.tasks.join_next() => {
                match joined {
                    Ok(event) => {
                        session.handle(event);
                    }
                    Err(e) => tracing::warn!("Background fetch task failed: {e}"),
                }
            }
            Ok(()) = filter_changes.changed() => {
                let criteria = filter_changes.borrow_and_update().clone();
                println!(
                    "{} {} (revision {})",
                    "Filters:".dimmed(),
                    describe_filters(&criteria),
                    session.engine.filters().revision()
                );
            }
        }
    }

    session.search.cancel();
    session.tasks.abort_all();
    Ok(())
}

pub async fn cmd_browse(
    collection: Collection,
    filters: &FilterArgs,
    limit: Option<u32>,
) -> Result<()> {
    match collection {
        Collection::Jobs => browse(JobsDomain, filters, limit, collection).await,
        Collection::Posts => browse(PostsDomain, filters, limit, collection).await,
    }
}
