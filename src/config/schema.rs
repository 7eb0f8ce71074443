use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::listing::DEFAULT_PAGE_SIZE;
use crate::scoring::ScoreWeights;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "20s";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL of the resort API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in humantime format ("20s", "1m")
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,

    /// Resorts shown per page in `list`
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default)]
    pub scoring: ScoreWeights,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> String {
    DEFAULT_REQUEST_TIMEOUT.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout: default_request_timeout(),
            page_size: default_page_size(),
            scoring: ScoreWeights::default(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Result<Duration> {
        humantime::parse_duration(self.request_timeout.trim())
            .with_context(|| format!("Invalid request_timeout '{}'", self.request_timeout))
    }
}
