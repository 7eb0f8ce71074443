//! Session cache for per-resort history.
//!
//! Entries are created on first request and never evicted. The lock only
//! guards state transitions; it is never held across an await.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, warn};

use super::error::FetchError;
use super::types::HistoryPoint;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum HistoryEntry {
    #[default]
    NotFetched,
    Loading,
    Ready(Vec<HistoryPoint>),
    Failed(String),
}

impl HistoryEntry {
    /// Whether `load` may start a fetch for this entry
    fn wants_fetch(&self) -> bool {
        matches!(self, HistoryEntry::NotFetched | HistoryEntry::Failed(_))
    }
}

/// Shared map from resort id to its history state. Clones share the map.
#[derive(Debug, Clone, Default)]
pub struct HistoryCache {
    entries: Arc<Mutex<HashMap<String, HistoryEntry>>>,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, HistoryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state for `id`; `NotFetched` when never requested
    pub fn entry(&self, id: &str) -> HistoryEntry {
        self.lock().get(id).cloned().unwrap_or_default()
    }

    /// Mark `id` as loading if no fetch is running and no data is cached.
    /// Returns whether the caller now owns the fetch.
    fn begin(&self, id: &str) -> bool {
        let mut entries = self.lock();
        let entry = entries.entry(id.to_string()).or_default();
        if entry.wants_fetch() {
            *entry = HistoryEntry::Loading;
            true
        } else {
            false
        }
    }

    fn finish(&self, id: &str, result: Result<Vec<HistoryPoint>, FetchError>) -> HistoryEntry {
        let entry = match result {
            Ok(points) => {
                debug!("History for {} ready ({} points)", id, points.len());
                HistoryEntry::Ready(points)
            }
            Err(e) => {
                warn!("History for {} failed: {}", id, e);
                HistoryEntry::Failed(e.to_string())
            }
        };
        self.lock().insert(id.to_string(), entry.clone());
        entry
    }

    /// Fetch history for `id` unless it is already loading or loaded.
    ///
    /// A `Failed` entry is fetched again. Returns the entry after the call,
    /// which is `Loading` when another task owns the fetch.
    pub async fn load<F, Fut>(&self, id: &str, fetch: F) -> HistoryEntry
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Vec<HistoryPoint>, FetchError>>,
    {
        if !self.begin(id) {
            return self.entry(id);
        }
        let result = fetch(id.to_string()).await;
        self.finish(id, result)
    }

    /// Load several resorts concurrently. Duplicate ids are fetched once;
    /// results come back in first-seen order.
    pub async fn load_many<F, Fut>(&self, ids: &[String], fetch: F) -> Vec<(String, HistoryEntry)>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<Vec<HistoryPoint>, FetchError>>,
    {
        let mut seen = HashSet::new();
        let unique: Vec<&String> = ids.iter().filter(|id| seen.insert(id.as_str())).collect();

        let mut futures = FuturesUnordered::new();
        for id in unique.iter().copied() {
            let fetch = &fetch;
            futures.push(async move { (id.to_string(), self.load(id, fetch).await) });
        }

        let mut loaded = HashMap::new();
        while let Some((id, entry)) = futures.next().await {
            loaded.insert(id, entry);
        }

        unique
            .into_iter()
            .map(|id| {
                let entry = loaded.remove(id.as_str()).unwrap_or_default();
                (id.clone(), entry)
            })
            .collect()
    }
}
