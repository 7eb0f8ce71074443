//! Whole-collection aggregates for the dashboard header and charts.

use std::collections::BTreeMap;

use crate::api::ResortsResponse;
use crate::listing::{sort_resorts, SortKey};
use crate::resort::ResortSnapshot;

/// Number of entries in each top list
pub const TOP_LIST_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct TopEntry {
    pub id: String,
    pub name: String,
    pub value: f64,
}

/// Aggregates over the entire dataset, independent of filters and paging.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardSummary {
    pub total_count: usize,
    /// Resorts that are `Open` or `PartiallyOpen`
    pub open_count: usize,
    /// Mean mountain snow depth, rounded to whole cm
    pub avg_snow_mountain: f64,
    pub total_new_snow: f64,
    /// Rounded to one decimal
    pub total_open_km: f64,
    pub top_snow: Vec<TopEntry>,
    pub top_new_snow: Vec<TopEntry>,
    /// Resort count per avalanche level 1..=5; unknown levels are not counted
    pub avalanche_distribution: BTreeMap<u8, usize>,
    pub available_countries: Vec<String>,
    /// Country code -> regions in that country
    pub available_regions: BTreeMap<String, Vec<String>>,
}

impl DashboardSummary {
    pub fn from_resorts(resorts: &[ResortSnapshot]) -> Self {
        let total_count = resorts.len();
        let open_count = resorts.iter().filter(|r| r.status.is_operating()).count();

        let avg_snow_mountain = if total_count > 0 {
            (resorts.iter().map(|r| r.snow_mountain).sum::<f64>() / total_count as f64).round()
        } else {
            0.0
        };
        let total_new_snow = resorts.iter().map(|r| r.new_snow).sum();
        let total_open_km = round_to_tenth(resorts.iter().filter_map(|r| r.slopes_open_km).sum());

        let mut avalanche_distribution: BTreeMap<u8, usize> = (1..=5).map(|level| (level, 0)).collect();
        for resort in resorts.iter().filter(|r| r.avalanche_warning.is_known()) {
            *avalanche_distribution
                .entry(resort.avalanche_warning.get())
                .or_default() += 1;
        }

        let (available_countries, available_regions) = vocabulary(resorts);

        Self {
            total_count,
            open_count,
            avg_snow_mountain,
            total_new_snow,
            total_open_km,
            top_snow: top_by(resorts, SortKey::SnowMountain, |r| r.snow_mountain),
            top_new_snow: top_by(resorts, SortKey::NewSnow, |r| r.new_snow),
            avalanche_distribution,
            available_countries,
            available_regions,
        }
    }
}

impl DashboardSummary {
    /// Overwrite local aggregates with the ones the server computed over its
    /// full dataset. Absent fields keep the local value.
    pub fn merge_server_aggregates(&mut self, response: &ResortsResponse) {
        if let Some(total) = response.total_count {
            self.total_count = total;
        }
        if let Some(open) = response.open_count {
            self.open_count = open;
        }
        if let Some(avg) = response.avg_snow_mountain {
            self.avg_snow_mountain = avg.max(0.0).round();
        }
        if let Some(total) = response.total_new_snow {
            self.total_new_snow = total.max(0.0);
        }
        if let Some(km) = response.total_open_km {
            self.total_open_km = round_to_tenth(km.max(0.0));
        }
        if let Some(top) = &response.top_snow_resorts {
            self.top_snow = top_entries(top, |r| r.snow_mountain);
        }
        if let Some(top) = &response.top_new_snow_resorts {
            self.top_new_snow = top_entries(top, |r| r.new_snow);
        }
        if let Some(distribution) = &response.avalanche_distribution {
            for level in 1..=5u8 {
                self.avalanche_distribution
                    .insert(level, distribution.get(&level).copied().unwrap_or(0));
            }
        }
        if let Some(countries) = &response.available_countries {
            self.available_countries = countries.clone();
        }
        if let Some(regions) = &response.available_regions {
            self.available_regions = regions.clone();
        }
    }
}

/// Server top lists arrive pre-ranked; keep their order.
fn top_entries(resorts: &[ResortSnapshot], value: impl Fn(&ResortSnapshot) -> f64) -> Vec<TopEntry> {
    resorts
        .iter()
        .take(TOP_LIST_LEN)
        .map(|r| TopEntry {
            id: r.id.clone(),
            name: r.name.clone(),
            value: value(r),
        })
        .collect()
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn top_by(resorts: &[ResortSnapshot], key: SortKey, value: impl Fn(&ResortSnapshot) -> f64) -> Vec<TopEntry> {
    let mut refs: Vec<&ResortSnapshot> = resorts.iter().collect();
    sort_resorts(&mut refs, key);
    refs.into_iter()
        .take(TOP_LIST_LEN)
        .map(|r| TopEntry {
            id: r.id.clone(),
            name: r.name.clone(),
            value: value(r),
        })
        .collect()
}

/// Filter vocabulary: sorted unique countries, and sorted unique regions per country.
pub fn vocabulary(resorts: &[ResortSnapshot]) -> (Vec<String>, BTreeMap<String, Vec<String>>) {
    let mut regions: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for resort in resorts.iter().filter(|r| !r.country.is_empty()) {
        let list = regions.entry(resort.country.clone()).or_default();
        if !resort.region.is_empty() && !list.contains(&resort.region) {
            list.push(resort.region.clone());
        }
    }
    for list in regions.values_mut() {
        list.sort_by(|a, b| crate::listing::compare_names(a, b));
    }
    let countries = regions.keys().cloned().collect();
    (countries, regions)
}
