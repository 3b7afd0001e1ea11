//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config set`: Set a configuration value
//! - `config path`: Print the config file location

use owo_colors::OwoColorize;
use serde_json::json;

use crate::config::Config;
use crate::error::Result;

/// Mask a sensitive value by showing only the first 2 and last 2 characters
fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

fn show_value(value: Option<&str>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "(not set)".dimmed().to_string(),
    }
}

/// Show current configuration, with environment overrides applied
pub fn cmd_config_show(json: bool) -> Result<()> {
    let config = Config::load()?;
    let path = Config::config_path();
    let base_url = config.api_base_url();
    let token_configured = config.api_token().is_some();
    let viewer_id = config.viewer_id();

    if json {
        let output = json!({
            "api": {
                "base_url": base_url,
                "token_configured": token_configured,
                "viewer_id": viewer_id,
            },
            "listing": {
                "page_size": config.listing.page_size,
                "search_debounce_ms": config.listing.search_debounce_ms,
            },
            "config_file": path.to_string_lossy(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let token = config
        .api
        .token
        .as_deref()
        .map(mask_sensitive_value)
        .or_else(|| token_configured.then(|| "(from environment)".to_string()));

    println!("{}\n", "Configuration:".cyan().bold());
    println!("{}:", "api".cyan());
    println!("  base_url: {}", show_value(base_url.as_deref()));
    println!("  token: {}", show_value(token.as_deref()));
    println!("  viewer_id: {}", show_value(viewer_id.as_deref()));
    println!("{}:", "listing".cyan());
    println!("  page_size: {}", config.listing.page_size);
    println!(
        "  search_debounce_ms: {}",
        config.listing.search_debounce_ms
    );
    println!("\n{} {}", "Config file:".dimmed(), path.display());
    Ok(())
}

pub fn cmd_config_set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set_value(key, value)?;
    config.save()?;

    let shown = if key == "api.token" {
        mask_sensitive_value(value)
    } else {
        value.to_string()
    };
    println!("Set {} to {}", key.cyan(), shown);
    Ok(())
}

pub fn cmd_config_path() -> Result<()> {
    println!("{}", Config::config_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_sensitive_value_ascii() {
        assert_eq!(mask_sensitive_value("abcdefgh"), "ab...gh");
    }

    #[test]
    fn test_mask_sensitive_value_short() {
        assert_eq!(mask_sensitive_value("abcd"), "****");
        assert_eq!(mask_sensitive_value(""), "****");
    }

    #[test]
    fn test_mask_sensitive_value_multibyte_utf8() {
        assert_eq!(mask_sensitive_value("ééééé"), "éé...éé");
    }
}
