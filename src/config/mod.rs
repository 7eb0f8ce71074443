pub mod init;
mod schema;

pub use schema::{Config, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT};

use anyhow::{Context, Result};
use log::debug;
use reqwest::Url;
use std::fs;
use std::path::PathBuf;

use crate::scoring::validate_weights;

/// Get the config directory path (~/.config/shred-score/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("shred-score"))
}

/// Get the default config file path (~/.config/shred-score/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/shred-score/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed or contains unknown fields
///
/// A missing file at the default path is not an error: defaults apply.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = match path {
        Some(path) => path,
        None => get_config_path()?,
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        debug!("No config at {}, using defaults", config_path.display());
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    // An empty file is a valid, all-defaults config
    if config_content.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    debug!("Loaded config from {}", config_path.display());
    Ok(config)
}

/// Validate a loaded config.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    match Url::parse(config.api_url.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(format!(
            "api_url: unsupported scheme '{}' (expected http or https)",
            url.scheme()
        )),
        Err(e) => errors.push(format!("api_url: {} ('{}')", e, config.api_url)),
    }

    match humantime::parse_duration(config.request_timeout.trim()) {
        Ok(d) if d.is_zero() => errors.push("request_timeout: must be greater than zero".to_string()),
        Ok(_) => {}
        Err(e) => errors.push(format!("request_timeout: {} ('{}')", e, config.request_timeout)),
    }

    if config.page_size == 0 {
        errors.push("page_size: must be at least 1".to_string());
    }

    if let Err(weight_errors) = validate_weights(&config.scoring) {
        errors.extend(weight_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
