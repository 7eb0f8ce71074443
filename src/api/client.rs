use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::debug;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use super::error::FetchError;
use super::types::{HistoryPoint, ResortsResponse};

/// The server pages `/api/resorts` with a default limit of 50; ask for the
/// whole collection since filtering and paging happen client-side.
const COLLECTION_LIMIT: u32 = 10_000;

/// HTTP client for the resort API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url.trim())
            .with_context(|| format!("Invalid API URL '{}'", base_url))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            bail!("Invalid API URL '{}': expected an http(s) URL", base_url);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("shred-score/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `base` + path segments, keeping any path prefix the base carries
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Fetch the full resort collection with any server-side aggregates.
    pub async fn fetch_resorts(&self) -> Result<ResortsResponse, FetchError> {
        let mut url = self.endpoint(&["api", "resorts"]);
        url.query_pairs_mut()
            .append_pair("limit", &COLLECTION_LIMIT.to_string())
            .append_pair("offset", "0");
        let response: ResortsResponse = self.get_json(url).await?;
        debug!("Fetched {} resorts", response.resorts.len());
        Ok(response)
    }

    /// Fetch the condition history of one resort.
    pub async fn fetch_history(&self, id: &str) -> Result<Vec<HistoryPoint>, FetchError> {
        let url = self.endpoint(&["api", "resorts", id, "history"]);
        let points: Vec<HistoryPoint> = self.get_json(url).await?;
        debug!("Fetched {} history points for resort {}", points.len(), id);
        Ok(points)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        // Exponential backoff, 3 attempts, transient failures only
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(3);

        let http = &self.http;
        let url = &url;
        let body = RetryIf::spawn(
            retry_strategy,
            move || async move {
                debug!("GET {}", url);
                let response = http.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                Ok(response.bytes().await?)
            },
            |e: &FetchError| {
                let retry = e.is_transient();
                if retry {
                    debug!("Retrying after: {}", e);
                }
                retry
            },
        )
        .await?;

        Ok(serde_json::from_slice(&body)?)
    }
}
