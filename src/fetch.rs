use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::HashSet;

use crate::api::ApiClient;
use crate::resort::ResortSnapshot;
use crate::scoring::{score_all, ScoreWeights, ScoringStats};
use crate::summary::DashboardSummary;

/// Where resort data comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    Api(ApiClient),
    /// The bundled sample dataset
    Mock,
}

/// A scored collection and its whole-dataset summary.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub resorts: Vec<ResortSnapshot>,
    pub summary: DashboardSummary,
    pub stats: ScoringStats,
}

/// Fetch the collection, drop duplicate ids, make sure every resort carries
/// a score, and build the summary.
///
/// Called from main.rs for every command that needs the collection. Server
/// aggregates, when present, take precedence over locally computed ones.
pub async fn load_dashboard(source: &DataSource, weights: &ScoreWeights) -> Result<Dashboard> {
    let (resorts, response) = match source {
        DataSource::Api(client) => {
            let mut response = client
                .fetch_resorts()
                .await
                .with_context(|| format!("Failed to load resorts from {}", client.base_url()))?;
            let resorts = std::mem::take(&mut response.resorts);
            (resorts, Some(response))
        }
        DataSource::Mock => {
            info!("Using bundled mock dataset");
            (crate::mock::resorts()?, None)
        }
    };

    let mut resorts = dedup_by_id(resorts);
    let stats = score_all(&mut resorts, weights);

    let mut summary = DashboardSummary::from_resorts(&resorts);
    if let Some(response) = &response {
        summary.merge_server_aggregates(response);
    }

    Ok(Dashboard {
        resorts,
        summary,
        stats,
    })
}

/// Keep the first resort for each id; resorts without an id are kept.
fn dedup_by_id(resorts: Vec<ResortSnapshot>) -> Vec<ResortSnapshot> {
    let before = resorts.len();
    let mut seen_ids = HashSet::new();
    let unique: Vec<_> = resorts
        .into_iter()
        .filter(|r| r.id.is_empty() || seen_ids.insert(r.id.clone()))
        .collect();

    if unique.len() < before {
        debug!("Dropped {} duplicate resorts", before - unique.len());
    }
    unique
}
