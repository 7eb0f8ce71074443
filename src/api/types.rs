use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::resort::wire::{self, RawScore};
use crate::resort::{ResortSnapshot, ShredScoreBreakdown};

/// Body of `GET /api/resorts`.
///
/// Only `resorts` is required. The aggregates describe the whole backing
/// dataset and are kept when the server sends them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResortsResponse {
    pub resorts: Vec<ResortSnapshot>,
    #[serde(default, deserialize_with = "count")]
    pub total_count: Option<usize>,
    #[serde(default, deserialize_with = "count")]
    pub open_count: Option<usize>,
    #[serde(default, deserialize_with = "wire::number")]
    pub avg_snow_mountain: Option<f64>,
    #[serde(default, deserialize_with = "wire::number")]
    pub total_new_snow: Option<f64>,
    #[serde(default, deserialize_with = "wire::number")]
    pub total_open_km: Option<f64>,
    #[serde(default)]
    pub top_snow_resorts: Option<Vec<ResortSnapshot>>,
    #[serde(default)]
    pub top_new_snow_resorts: Option<Vec<ResortSnapshot>>,
    #[serde(default, deserialize_with = "distribution")]
    pub avalanche_distribution: Option<BTreeMap<u8, usize>>,
    #[serde(default)]
    pub available_countries: Option<Vec<String>>,
    #[serde(default)]
    pub available_regions: Option<BTreeMap<String, Vec<String>>>,
}

fn count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(wire::number(deserializer)?
        .filter(|n| *n >= 0.0)
        .map(|n| n as usize))
}

/// JSON object keys are strings; levels outside 1..=5 are dropped.
fn distribution<'de, D>(deserializer: D) -> Result<Option<BTreeMap<u8, usize>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = match Option::<BTreeMap<String, Value>>::deserialize(deserializer)? {
        Some(raw) => raw,
        None => return Ok(None),
    };
    let mut levels = BTreeMap::new();
    for (key, value) in raw {
        let level = match key.trim().parse::<u8>() {
            Ok(level @ 1..=5) => level,
            _ => continue,
        };
        if let Some(n) = wire::number_from_value(&value).filter(|n| *n >= 0.0) {
            levels.insert(level, n as usize);
        }
    }
    Ok(Some(levels))
}

/// One point of a resort's condition history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPoint {
    pub date: String,
    pub timestamp: Option<NaiveDateTime>,
    pub snow_mountain: f64,
    pub snow_valley: f64,
    pub new_snow: f64,
    /// Present whenever the server scored the snapshot
    pub shred_score: Option<f64>,
    /// Present only when every component was reported
    pub breakdown: Option<ShredScoreBreakdown>,
    pub lifts_open: Option<u32>,
    pub lifts_total: Option<u32>,
    pub slopes_open: Option<u32>,
    pub slopes_total: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawHistoryPoint {
    #[serde(deserialize_with = "wire::text")]
    date: Option<String>,
    #[serde(deserialize_with = "wire::text")]
    timestamp: Option<String>,
    #[serde(deserialize_with = "wire::number")]
    snow_mountain: Option<f64>,
    #[serde(deserialize_with = "wire::number")]
    snow_valley: Option<f64>,
    #[serde(deserialize_with = "wire::number")]
    new_snow: Option<f64>,
    #[serde(deserialize_with = "wire::number")]
    lifts_open: Option<f64>,
    #[serde(deserialize_with = "wire::number")]
    lifts_total: Option<f64>,
    #[serde(deserialize_with = "wire::number")]
    slopes_open: Option<f64>,
    #[serde(deserialize_with = "wire::number")]
    slopes_total: Option<f64>,
    #[serde(flatten)]
    score: RawScore,
}

impl<'de> Deserialize<'de> for HistoryPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawHistoryPoint::deserialize(deserializer)?;
        let timestamp = raw.timestamp.as_deref().and_then(wire::parse_timestamp);
        let date = raw
            .date
            .or_else(|| timestamp.map(|t| t.date().to_string()))
            .unwrap_or_default();
        let shred_score = raw.score.shred_score().map(|s| s.clamp(0.0, 10.0));

        Ok(HistoryPoint {
            date,
            timestamp,
            snow_mountain: wire::non_negative(raw.snow_mountain),
            snow_valley: wire::non_negative(raw.snow_valley),
            new_snow: wire::non_negative(raw.new_snow),
            shred_score,
            breakdown: raw.score.into_breakdown(),
            lifts_open: wire::count(raw.lifts_open),
            lifts_total: wire::count(raw.lifts_total),
            slopes_open: wire::count(raw.slopes_open),
            slopes_total: wire::count(raw.slopes_total),
        })
    }
}
