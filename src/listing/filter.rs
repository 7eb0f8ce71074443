use log::warn;

use super::ListConfig;
use crate::resort::ResortSnapshot;

/// One filter condition. A resort is visible when every active predicate matches.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<'c> {
    /// Lowercased needle, matched as a substring of the lowercased name
    Search(String),
    OpenOnly,
    Country(&'c str),
    Region(&'c str),
}

impl Predicate<'_> {
    pub fn matches(&self, resort: &ResortSnapshot) -> bool {
        match self {
            Predicate::Search(needle) => resort.name.to_lowercase().contains(needle.as_str()),
            Predicate::OpenOnly => resort.status.is_operating(),
            Predicate::Country(country) => resort.country == *country,
            Predicate::Region(region) => resort.region == *region,
        }
    }
}

/// Build the active predicates for `config`, in search, open-only, country,
/// region order.
///
/// Country and region values that no resort in `all` carries are stale UI
/// selections and are skipped. The check runs against the full collection so
/// it cannot depend on the order the predicates are applied in.
pub fn build_predicates<'c>(config: &'c ListConfig, all: &[ResortSnapshot]) -> Vec<Predicate<'c>> {
    let mut predicates = Vec::new();

    let query = config.search_query.trim();
    if !query.is_empty() {
        predicates.push(Predicate::Search(query.to_lowercase()));
    }

    if config.open_only {
        predicates.push(Predicate::OpenOnly);
    }

    if let Some(country) = selection(&config.country) {
        if all.iter().any(|r| r.country == country) {
            predicates.push(Predicate::Country(country));
        } else {
            warn!("Ignoring country filter '{}': no resort carries it", country);
        }
    }

    if let Some(region) = selection(&config.region) {
        if all.iter().any(|r| r.region == region) {
            predicates.push(Predicate::Region(region));
        } else {
            warn!("Ignoring region filter '{}': no resort carries it", region);
        }
    }

    predicates
}

fn selection(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resort::{AvalancheLevel, OperatingStatus};

    fn resort(id: &str, name: &str, country: &str, region: &str, status: OperatingStatus) -> ResortSnapshot {
        ResortSnapshot {
            id: id.to_string(),
            name: name.to_string(),
            region: region.to_string(),
            country: country.to_string(),
            status,
            snow_valley: 0.0,
            snow_mountain: 0.0,
            new_snow: 0.0,
            snow_condition: "-".to_string(),
            last_snowfall: None,
            avalanche_warning: AvalancheLevel::UNKNOWN,
            lifts_open: None,
            lifts_total: None,
            slopes_open_km: None,
            slopes_total_km: None,
            slopes_open: None,
            slopes_total: None,
            slope_condition: None,
            altitude: None,
            location: None,
            last_update: None,
            url: String::new(),
            score: None,
        }
    }

    fn sample_resorts() -> Vec<ResortSnapshot> {
        vec![
            resort("1", "Kitzbühel", "AT", "Tirol", OperatingStatus::Open),
            resort("2", "Garmisch-Partenkirchen", "DE", "Bayern", OperatingStatus::PartiallyOpen),
            resort("3", "Zell am See - Kaprun", "AT", "Salzburg", OperatingStatus::Closed),
            resort("4", "Oberstdorf", "DE", "Bayern", OperatingStatus::Closed),
            resort("5", "Lech Zürs", "AT", "Vorarlberg", OperatingStatus::Open),
        ]
    }

    fn matching_ids(all: &[ResortSnapshot], predicate: &Predicate<'_>) -> Vec<String> {
        all.iter()
            .filter(|r| predicate.matches(r))
            .map(|r| r.id.clone())
            .collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let all = sample_resorts();
        assert_eq!(matching_ids(&all, &Predicate::Search("kitz".to_string())), vec!["1"]);

        let config = ListConfig {
            search_query: "  ZÜRS ".to_string(),
            ..ListConfig::default()
        };
        let predicates = build_predicates(&config, &all);
        assert_eq!(predicates, vec![Predicate::Search("zürs".to_string())]);
    }

    #[test]
    fn test_open_only_keeps_partial() {
        let all = sample_resorts();
        assert_eq!(matching_ids(&all, &Predicate::OpenOnly), vec!["1", "2", "5"]);
    }

    #[test]
    fn test_region_without_country() {
        let all = sample_resorts();
        assert_eq!(matching_ids(&all, &Predicate::Region("Bayern")), vec!["2", "4"]);
    }

    #[test]
    fn test_empty_config_has_no_predicates() {
        let all = sample_resorts();
        assert!(build_predicates(&ListConfig::default(), &all).is_empty());
    }

    #[test]
    fn test_stale_country_is_ignored() {
        let all = sample_resorts();
        let config = ListConfig {
            country: "CH".to_string(),
            region: "Wallis".to_string(),
            ..ListConfig::default()
        };
        assert!(build_predicates(&config, &all).is_empty());
    }
}
