//! Bundled sample dataset for offline use (`--mock`) and tests.

use anyhow::{Context, Result};

use crate::resort::ResortSnapshot;

const MOCK_RESORTS: &str = include_str!("../data/mock_resorts.json");

/// Ten Alpine resorts in the same wire format the API serves.
pub fn resorts() -> Result<Vec<ResortSnapshot>> {
    serde_json::from_str(MOCK_RESORTS).context("Bundled mock dataset is not valid resort JSON")
}
