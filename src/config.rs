//! Top-level application configuration.
//!
//! Configuration is stored in `.newsdesk/config.yaml` (in the working
//! directory) or, failing that, in the platform config directory, and
//! includes:
//! - The content API location and credentials
//! - The viewer identity used by the "mine" scope
//! - Listing defaults (page size, search debounce)

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{NewsdeskError, Result};
use crate::listing::engine::{DEFAULT_PAGE_SIZE, EngineOptions};
use crate::types::CONFIG_DIR;

pub const ENV_API_URL: &str = "NEWSDESK_API_URL";
pub const ENV_API_TOKEN: &str = "NEWSDESK_API_TOKEN";
pub const ENV_VIEWER_ID: &str = "NEWSDESK_VIEWER_ID";

pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

/// Keys accepted by `config set`
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api.base_url",
    "api.token",
    "api.viewer_id",
    "listing.page_size",
    "listing.search_debounce_ms",
];

const CONFIG_FILE: &str = "config.yaml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub listing: ListingConfig,
}

/// Content API connection settings
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Identity whose items the "mine" scope shows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer_id: Option<String>,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("viewer_id", &self.viewer_id)
            .finish()
    }
}

/// Listing defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Items per page (default: 20, max: 100)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Quiet period before a search edit is applied (default: 500ms)
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_search_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

/// Non-empty value of an environment variable
fn env_override(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn with_path_context(e: std::io::Error, action: &str, path: &Path) -> NewsdeskError {
    NewsdeskError::Io(std::io::Error::new(
        e.kind(),
        format!("Failed to {action} config at {}: {e}", path.display()),
    ))
}

impl Config {
    /// Path of the project-local config file
    pub fn local_path() -> PathBuf {
        PathBuf::from(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Path of the per-user config file, if the platform has a config dir
    pub fn user_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "newsdesk").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Config file in effect: the local file when it exists, else the user file
    pub fn config_path() -> PathBuf {
        let local = Self::local_path();
        if local.exists() {
            return local;
        }
        Self::user_path().unwrap_or(local)
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content =
            fs::read_to_string(path).map_err(|e| with_path_context(e, "read", path))?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the file it was loaded from
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| with_path_context(e, "create directory for", parent))?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).map_err(|e| with_path_context(e, "write", path))?;

        // The file may hold an API token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, permissions)
                .map_err(|e| with_path_context(e, "set permissions on", path))?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.listing.page_size) {
            return Err(NewsdeskError::InvalidValue(
                "listing.page_size",
                format!(
                    "{} (must be between 1 and {MAX_PAGE_SIZE})",
                    self.listing.page_size
                ),
            ));
        }
        Ok(())
    }

    /// API base URL from environment variable or config
    pub fn api_base_url(&self) -> Option<String> {
        env_override(ENV_API_URL).or_else(|| self.api.base_url.clone())
    }

    /// API token from environment variable or config
    pub fn api_token(&self) -> Option<SecretString> {
        env_override(ENV_API_TOKEN)
            .or_else(|| self.api.token.clone())
            .map(SecretString::from)
    }

    /// Viewer identity from environment variable or config
    pub fn viewer_id(&self) -> Option<String> {
        env_override(ENV_VIEWER_ID).or_else(|| self.api.viewer_id.clone())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.listing.search_debounce_ms)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            page_size: self.listing.page_size,
            viewer_id: self.viewer_id(),
        }
    }

    /// Set a value by its dotted key, validating it first
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());
        match key {
            "api.base_url" => {
                if !value.is_empty() {
                    url::Url::parse(value)?;
                }
                self.api.base_url = optional(value);
            }
            "api.token" => self.api.token = optional(value),
            "api.viewer_id" => self.api.viewer_id = optional(value),
            "listing.page_size" => {
                let size: u32 = value
                    .parse()
                    .map_err(|_| NewsdeskError::InvalidValue("listing.page_size", value.to_string()))?;
                if !(1..=MAX_PAGE_SIZE).contains(&size) {
                    return Err(NewsdeskError::InvalidValue(
                        "listing.page_size",
                        format!("{size} (must be between 1 and {MAX_PAGE_SIZE})"),
                    ));
                }
                self.listing.page_size = size;
            }
            "listing.search_debounce_ms" => {
                self.listing.search_debounce_ms = value.parse().map_err(|_| {
                    NewsdeskError::InvalidValue("listing.search_debounce_ms", value.to_string())
                })?;
            }
            _ => {
                return Err(NewsdeskError::Config(format!(
                    "unknown config key '{key}'. Valid keys: {}",
                    VALID_CONFIG_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}
