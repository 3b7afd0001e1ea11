use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use jiff::civil::Date;
use std::io;
use std::str::FromStr;

use crate::config::MAX_PAGE_SIZE;
use crate::error::Result;
use crate::listing::filter::{
    DateRange, FilterCriteria, NumericRange, ScopeTab, SortKey, VALID_SORT_KEYS,
};

#[derive(Parser)]
#[command(name = "newsdesk")]
#[command(about = "Browse and manage jobs and posts on a content backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Job listings
    #[command(visible_alias = "j")]
    Jobs {
        #[command(subcommand)]
        action: ListingAction,
    },

    /// Post listings
    #[command(visible_alias = "p")]
    Posts {
        #[command(subcommand)]
        action: ListingAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ListingAction {
    /// Print one page of the listing
    Ls {
        #[command(flatten)]
        filters: FilterArgs,

        /// Page to print, counting from 1
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Items per page (overrides listing.page_size)
        #[arg(short = 'n', long, value_parser = parse_limit)]
        limit: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse the listing interactively
    #[command(visible_alias = "b")]
    Browse {
        #[command(flatten)]
        filters: FilterArgs,

        /// Items per page (overrides listing.page_size)
        #[arg(short = 'n', long, value_parser = parse_limit)]
        limit: Option<u32>,
    },

    /// Delete items
    #[command(visible_alias = "rm")]
    Delete {
        /// Item IDs
        #[arg(required = true, num_args = 1.., value_parser = parse_item_id)]
        ids: Vec<String>,
    },

    /// Duplicate an item
    Duplicate {
        #[arg(value_parser = parse_item_id)]
        id: String,
    },

    /// Change the status of an item
    Status {
        #[arg(value_parser = parse_item_id)]
        id: String,

        /// New status
        status: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a configuration value
    Set {
        /// Key (api.base_url, api.token, api.viewer_id, listing.page_size, listing.search_debounce_ms)
        key: String,

        /// Value; an empty string clears optional keys
        value: String,
    },

    /// Print the path of the config file in use
    Path,
}

/// Filter flags shared by `ls` and `browse`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only items with this status
    #[arg(long)]
    pub status: Option<String>,

    /// Job type, or post category
    #[arg(short = 't', long = "type")]
    pub item_type: Option<String>,

    /// Job location
    #[arg(long)]
    pub location: Option<String>,

    /// Lower bound of the numeric range (salary for jobs, views for posts)
    #[arg(long)]
    pub min: Option<u64>,

    /// Upper bound of the numeric range
    #[arg(long)]
    pub max: Option<u64>,

    /// Earliest date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub from: Option<Date>,

    /// Latest date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub to: Option<Date>,

    /// Sort order
    #[arg(long, default_value = "newest", value_parser = parse_sort)]
    pub sort: SortKey,

    /// Only items created by the configured viewer
    #[arg(long)]
    pub mine: bool,
}

impl FilterArgs {
    /// Build criteria, rejecting inverted ranges
    pub fn to_criteria(&self) -> std::result::Result<FilterCriteria, String> {
        if let (Some(min), Some(max)) = (self.min, self.max)
            && min > max
        {
            return Err(format!("--min ({min}) is greater than --max ({max})"));
        }
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(format!("--from ({from}) is after --to ({to})"));
        }

        let scope = if self.mine {
            ScopeTab::Mine
        } else {
            ScopeTab::All
        };
        Ok(FilterCriteria::new()
            .with_search_text(self.search.clone().unwrap_or_default())
            .with_status(self.status.clone())
            .with_item_type(self.item_type.clone())
            .with_location(self.location.clone())
            .with_numeric_range(NumericRange::new(self.min, self.max))
            .with_date_range(DateRange::new(self.from, self.to))
            .with_sort(self.sort)
            .with_scope(scope))
    }
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> Result<()> {
        use crate::commands::{
            Collection, cmd_browse, cmd_config_path, cmd_config_set, cmd_config_show, cmd_delete,
            cmd_duplicate, cmd_ls, cmd_set_status,
        };

        let (collection, action) = match self {
            Commands::Jobs { action } => (Collection::Jobs, action),
            Commands::Posts { action } => (Collection::Posts, action),
            Commands::Config { action } => {
                return match action {
                    ConfigAction::Show { json } => cmd_config_show(json),
                    ConfigAction::Set { key, value } => cmd_config_set(&key, &value),
                    ConfigAction::Path => cmd_config_path(),
                };
            }
            Commands::Completions { shell } => {
                generate_completions(shell);
                return Ok(());
            }
        };

        match action {
            ListingAction::Ls {
                filters,
                page,
                limit,
                json,
            } => cmd_ls(collection, &filters, page, limit, json).await,
            ListingAction::Browse { filters, limit } => {
                cmd_browse(collection, &filters, limit).await
            }
            ListingAction::Delete { ids } => cmd_delete(collection, &ids).await,
            ListingAction::Duplicate { id } => cmd_duplicate(collection, &id).await,
            ListingAction::Status { id, status } => {
                cmd_set_status(collection, &id, &status).await
            }
        }
    }
}

fn parse_sort(s: &str) -> std::result::Result<SortKey, String> {
    SortKey::from_str(s).map_err(|_| {
        format!(
            "Invalid sort. Must be one of: {}",
            VALID_SORT_KEYS.join(", ")
        )
    })
}

fn parse_date(s: &str) -> std::result::Result<Date, String> {
    s.trim()
        .parse::<Date>()
        .map_err(|e| format!("Invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

fn parse_limit(s: &str) -> std::result::Result<u32, String> {
    match s.parse::<u32>() {
        Ok(n) if (1..=MAX_PAGE_SIZE).contains(&n) => Ok(n),
        _ => Err(format!(
            "Invalid limit '{s}'. Must be between 1 and {MAX_PAGE_SIZE}"
        )),
    }
}

fn parse_item_id(s: &str) -> std::result::Result<String, String> {
    if s.trim().is_empty() {
        return Err("ID cannot be empty".to_string());
    }
    Ok(s.trim().to_string())
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "newsdesk", &mut io::stdout());
}
