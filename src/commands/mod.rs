mod browse;
mod config;
mod ls;
mod mutate;

pub use browse::{BrowseCommand, cmd_browse, parse_browse_command};
pub use config::{cmd_config_path, cmd_config_set, cmd_config_show};
pub use ls::{cmd_ls, walk_to_page};
pub use mutate::{cmd_delete, cmd_duplicate, cmd_set_status};

use crate::backend::HttpBackend;
use crate::config::Config;
use crate::domains::jobs::{VALID_JOB_STATUSES, VALID_JOB_TYPES};
use crate::domains::posts::VALID_POST_STATUSES;
use crate::error::{NewsdeskError, Result};
use crate::listing::{EngineOptions, FilterCriteria, ListingDomain, ListingEngine};

/// Which collection a command operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Jobs,
    Posts,
}

impl Collection {
    pub fn valid_statuses(self) -> &'static [&'static str] {
        match self {
            Collection::Jobs => VALID_JOB_STATUSES,
            Collection::Posts => VALID_POST_STATUSES,
        }
    }

    /// Allowed values of the `type` filter; posts take any category id
    pub fn valid_types(self) -> Option<&'static [&'static str]> {
        match self {
            Collection::Jobs => Some(VALID_JOB_TYPES),
            Collection::Posts => None,
        }
    }

    /// Reject statuses and types the collection does not know
    pub fn validate(self, criteria: &FilterCriteria) -> Result<()> {
        if let Some(status) = &criteria.status {
            validate_choice("status", status, self.valid_statuses())?;
        }
        if let (Some(kind), Some(valid)) = (&criteria.item_type, self.valid_types()) {
            validate_choice("type", kind, valid)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_choice(field: &'static str, value: &str, valid: &[&str]) -> Result<()> {
    if valid.contains(&value) {
        return Ok(());
    }
    Err(NewsdeskError::Other(format!(
        "invalid {field} '{value}'. Must be one of: {}",
        valid.join(", ")
    )))
}

/// Loaded config plus a backend built from it
pub(crate) fn connect() -> Result<(Config, HttpBackend)> {
    let config = Config::load()?;
    let backend = HttpBackend::from_config(&config)?;
    tracing::debug!(base_url = %backend.base_url(), "Connected to content API");
    Ok((config, backend))
}

pub(crate) fn engine_for<D: ListingDomain>(
    domain: D,
    config: &Config,
    limit: Option<u32>,
    criteria: FilterCriteria,
) -> ListingEngine<D> {
    let mut options: EngineOptions = config.engine_options();
    if let Some(limit) = limit {
        options.page_size = limit;
    }
    ListingEngine::with_filters(domain, options, criteria)
}
