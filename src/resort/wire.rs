//! Lenient decoding of the resort feed.
//!
//! Upstream values come from scraped reports and are not trusted: numbers may
//! arrive as strings with units or comma decimals, counts may be missing, and
//! score fields are only present when the server computed them. Everything
//! here degrades to "unreported" instead of failing the whole payload.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::types::{
    Altitude, AvalancheLevel, GeoPoint, OperatingStatus, ResortSnapshot, ShredScoreBreakdown,
};
use crate::scoring::config::{BASE_SNOW_CAP, FRESHNESS_CAP, MAX_SCORE, TERRAIN_CAP};

/// Extract a number from free-form report text such as `"120 cm"` or `"12,5"`.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim().replace(',', ".");
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let negative = s[..start].ends_with('-');
    let rest = &s[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let mut token = &rest[..end];
    // "1.2.3" keeps "1.2"
    if let Some(first) = token.find('.') {
        if let Some(second) = token[first + 1..].find('.') {
            token = &token[..first + 1 + second];
        }
    }
    let value: f64 = token.trim_end_matches('.').parse().ok()?;
    Some(if negative { -value } else { value })
}

pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

pub(crate) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(number_from_value))
}

/// Strings, or numbers rendered as strings. `"-"` and blank text count as absent.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    Ok(text.filter(|s| !s.is_empty() && s != "-"))
}

pub(crate) fn avalanche<'de, D>(deserializer: D) -> Result<Option<AvalancheLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let level = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .map(|v| AvalancheLevel::new(v.round() as i64)),
        Some(Value::String(s)) => Some(AvalancheLevel::parse(&s)),
        _ => None,
    };
    Ok(level)
}

/// Accepts `2024-12-18 08:30:00`, RFC 3339, and ISO timestamps without offset.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()))
}

pub(crate) fn non_negative(value: Option<f64>) -> f64 {
    value.map_or(0.0, |v| v.max(0.0))
}

pub(crate) fn count(value: Option<f64>) -> Option<u32> {
    value.map(|v| v.max(0.0).round() as u32)
}

fn clamp_open<T: PartialOrd + Copy>(open: Option<T>, total: Option<T>) -> Option<T> {
    match (open, total) {
        (Some(o), Some(t)) if o > t => Some(t),
        _ => open,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawAltitude {
    #[serde(deserialize_with = "number")]
    min: Option<f64>,
    #[serde(deserialize_with = "number")]
    max: Option<f64>,
}

/// Flat wire shape of a resort, score fields included.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawResort {
    #[serde(deserialize_with = "text")]
    id: Option<String>,
    #[serde(deserialize_with = "text")]
    name: Option<String>,
    #[serde(deserialize_with = "text")]
    region: Option<String>,
    #[serde(deserialize_with = "text")]
    country: Option<String>,
    #[serde(deserialize_with = "text")]
    status: Option<String>,
    #[serde(deserialize_with = "number")]
    snow_valley: Option<f64>,
    #[serde(deserialize_with = "number")]
    snow_mountain: Option<f64>,
    #[serde(deserialize_with = "number")]
    new_snow: Option<f64>,
    #[serde(deserialize_with = "text")]
    snow_condition: Option<String>,
    #[serde(deserialize_with = "text")]
    last_snowfall: Option<String>,
    #[serde(deserialize_with = "avalanche")]
    avalanche_warning: Option<AvalancheLevel>,
    #[serde(deserialize_with = "number")]
    lifts_open: Option<f64>,
    #[serde(deserialize_with = "number")]
    lifts_total: Option<f64>,
    #[serde(deserialize_with = "number")]
    slopes_open_km: Option<f64>,
    #[serde(deserialize_with = "number")]
    slopes_total_km: Option<f64>,
    #[serde(deserialize_with = "number")]
    slopes_open: Option<f64>,
    #[serde(deserialize_with = "number")]
    slopes_total: Option<f64>,
    #[serde(deserialize_with = "text")]
    slope_condition: Option<String>,
    #[serde(deserialize_with = "text")]
    last_update: Option<String>,
    altitude: Option<RawAltitude>,
    #[serde(deserialize_with = "text")]
    url: Option<String>,
    #[serde(deserialize_with = "number")]
    latitude: Option<f64>,
    #[serde(deserialize_with = "number")]
    longitude: Option<f64>,
    #[serde(flatten)]
    score: RawScore,
}

/// Score fields as the server emits them. `scoreCondition` is an older name
/// for the snow factor slot.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawScore {
    #[serde(deserialize_with = "number")]
    shred_score: Option<f64>,
    #[serde(deserialize_with = "number")]
    score_freshness: Option<f64>,
    #[serde(deserialize_with = "number")]
    score_base_snow: Option<f64>,
    #[serde(deserialize_with = "number")]
    score_terrain: Option<f64>,
    #[serde(deserialize_with = "number")]
    score_avalanche_penalty: Option<f64>,
    #[serde(deserialize_with = "number")]
    score_snow_factor: Option<f64>,
    #[serde(deserialize_with = "number", alias = "scoreConditions")]
    score_condition: Option<f64>,
    #[serde(deserialize_with = "number")]
    score_slope_factor: Option<f64>,
}

impl RawScore {
    pub(crate) fn shred_score(&self) -> Option<f64> {
        self.shred_score
    }

    /// A server breakdown is only accepted when it is complete enough to
    /// stand in for a local computation; otherwise the resort is rescored.
    ///
    /// Components are clamped to `0..=cap` and factors to `0..=1`. A penalty
    /// outside `(0, 1]` cannot be repaired, so the breakdown is dropped.
    pub(crate) fn into_breakdown(self) -> Option<ShredScoreBreakdown> {
        let avalanche_penalty = self
            .score_avalanche_penalty
            .filter(|p| *p > 0.0 && *p <= 1.0)?;
        Some(ShredScoreBreakdown {
            freshness: self.score_freshness?.clamp(0.0, FRESHNESS_CAP),
            base_snow: self.score_base_snow?.clamp(0.0, BASE_SNOW_CAP),
            terrain: self.score_terrain?.clamp(0.0, TERRAIN_CAP),
            avalanche_penalty,
            snow_factor: self
                .score_snow_factor
                .or(self.score_condition)
                .map_or(1.0, |f| f.clamp(0.0, 1.0)),
            slope_factor: self.score_slope_factor.map_or(1.0, |f| f.clamp(0.0, 1.0)),
            shred_score: self.shred_score?.clamp(0.0, MAX_SCORE),
        })
    }
}

impl From<RawResort> for ResortSnapshot {
    fn from(raw: RawResort) -> Self {
        let lifts_total = count(raw.lifts_total);
        let slopes_total_km = raw.slopes_total_km.map(|v| v.max(0.0));
        let slopes_total = count(raw.slopes_total);
        let altitude = raw.altitude.and_then(|a| match (a.min, a.max) {
            (Some(min), Some(max)) => Some(Altitude { min, max }),
            _ => None,
        });
        let location = match (raw.latitude, raw.longitude) {
            (Some(lat), Some(lon)) => GeoPoint::new(lat, lon),
            _ => None,
        };

        ResortSnapshot {
            id: raw.id.unwrap_or_default(),
            name: raw.name.unwrap_or_else(|| "Unknown Resort".to_string()),
            region: raw.region.unwrap_or_default(),
            country: raw.country.unwrap_or_default(),
            status: OperatingStatus::parse(raw.status.as_deref().unwrap_or("")),
            snow_valley: non_negative(raw.snow_valley),
            snow_mountain: non_negative(raw.snow_mountain),
            new_snow: non_negative(raw.new_snow),
            snow_condition: raw.snow_condition.unwrap_or_else(|| "-".to_string()),
            last_snowfall: raw.last_snowfall,
            avalanche_warning: raw.avalanche_warning.unwrap_or_default(),
            lifts_open: clamp_open(count(raw.lifts_open), lifts_total),
            lifts_total,
            slopes_open_km: clamp_open(raw.slopes_open_km.map(|v| v.max(0.0)), slopes_total_km),
            slopes_total_km,
            slopes_open: clamp_open(count(raw.slopes_open), slopes_total),
            slopes_total,
            slope_condition: raw.slope_condition,
            altitude,
            location,
            last_update: raw.last_update.as_deref().and_then(parse_timestamp),
            url: raw.url.unwrap_or_default(),
            score: raw.score.into_breakdown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> ResortSnapshot {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_number_variants() {
        assert_eq!(parse_number("120"), Some(120.0));
        assert_eq!(parse_number("120 cm"), Some(120.0));
        assert_eq!(parse_number("12,5"), Some(12.5));
        assert_eq!(parse_number("ca. 45cm"), Some(45.0));
        assert_eq!(parse_number("1.2.3"), Some(1.2));
        assert_eq!(parse_number("-5"), Some(-5.0));
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-12-18 08:30:00").is_some());
        assert!(parse_timestamp("2024-12-18T08:30:00").is_some());
        assert!(parse_timestamp("2024-12-18T08:30:00+01:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_decode_full_resort() {
        let resort = decode(
            r#"{
                "id": "2", "name": "Kitzbühel", "region": "Tirol", "country": "AT",
                "status": "Geöffnet", "snowValley": 30, "snowMountain": 120, "newSnow": 10,
                "snowCondition": "Griffig", "avalancheWarning": 2,
                "liftsOpen": 51, "liftsTotal": 57, "slopesOpenKm": 165, "slopesTotalKm": 188,
                "lastUpdate": "2024-12-18 07:45:00",
                "altitude": {"min": 800, "max": 2000},
                "url": "https://www.bergfex.at/kitzbuehel/",
                "latitude": 47.446, "longitude": 12.391
            }"#,
        );
        assert_eq!(resort.name, "Kitzbühel");
        assert_eq!(resort.status, OperatingStatus::Open);
        assert_eq!(resort.avalanche_warning.get(), 2);
        assert_eq!(resort.lift_ratio(), Some((51, 57)));
        assert_eq!(resort.slope_km_ratio(), Some((165.0, 188.0)));
        assert!(resort.altitude.is_some());
        assert!(resort.location.is_some());
        assert!(resort.last_update.is_some());
        assert!(resort.score.is_none());
    }

    #[test]
    fn test_decode_malformed_fields_degrade() {
        let resort = decode(
            r#"{
                "id": 7, "name": "Somewhere", "status": "",
                "snowMountain": "n/a", "newSnow": -4, "snowValley": "35 cm",
                "liftsOpen": null, "liftsTotal": 12,
                "avalancheWarning": "III", "lastUpdate": "garbage"
            }"#,
        );
        assert_eq!(resort.id, "7");
        assert_eq!(resort.status, OperatingStatus::Closed);
        assert_eq!(resort.snow_mountain, 0.0);
        assert_eq!(resort.new_snow, 0.0);
        assert_eq!(resort.snow_valley, 35.0);
        assert_eq!(resort.lifts_open, None);
        assert_eq!(resort.lift_ratio(), None);
        assert_eq!(resort.avalanche_warning.get(), 3);
        assert!(resort.last_update.is_none());
        assert!(resort.slopes_open_km.is_none());
    }

    #[test]
    fn test_decode_clamps_open_to_total() {
        let resort = decode(
            r#"{"id": "1", "liftsOpen": 20, "liftsTotal": 10, "slopesOpenKm": 50.5, "slopesTotalKm": 40}"#,
        );
        assert_eq!(resort.lifts_open, Some(10));
        assert_eq!(resort.slopes_open_km, Some(40.0));
    }

    #[test]
    fn test_decode_avalanche_out_of_range() {
        assert_eq!(decode(r#"{"avalancheWarning": 9}"#).avalanche_warning.get(), 5);
        assert_eq!(decode(r#"{"avalancheWarning": -1}"#).avalanche_warning.get(), 0);
        assert_eq!(decode(r#"{}"#).avalanche_warning.get(), 0);
    }

    #[test]
    fn test_decode_server_breakdown() {
        let resort = decode(
            r#"{
                "id": "3", "shredScore": 7.2, "scoreFreshness": 3.1, "scoreBaseSnow": 3.5,
                "scoreTerrain": 1.4, "scoreAvalanchePenalty": 0.85, "scoreCondition": 0.9
            }"#,
        );
        let score = resort.score.unwrap();
        assert_eq!(score.shred_score, 7.2);
        assert_eq!(score.snow_factor, 0.9);
        assert_eq!(score.slope_factor, 1.0);
    }

    #[test]
    fn test_decode_server_breakdown_out_of_range_is_clamped() {
        let resort = decode(
            r#"{
                "id": "4", "shredScore": 12, "scoreFreshness": -3, "scoreBaseSnow": 99,
                "scoreTerrain": 1, "scoreAvalanchePenalty": 0.65, "scoreSnowFactor": -0.2,
                "scoreSlopeFactor": 7
            }"#,
        );
        let score = resort.score.unwrap();
        assert_eq!(score.freshness, 0.0);
        assert_eq!(score.base_snow, BASE_SNOW_CAP);
        assert_eq!(score.terrain, 1.0);
        assert_eq!(score.avalanche_penalty, 0.65);
        assert_eq!(score.snow_factor, 0.0);
        assert_eq!(score.slope_factor, 1.0);
        assert_eq!(score.shred_score, MAX_SCORE);
    }

    #[test]
    fn test_decode_invalid_server_penalty_drops_breakdown() {
        for penalty in ["0", "-0.5", "1.2"] {
            let resort = decode(&format!(
                r#"{{"id": "5", "shredScore": 5, "scoreFreshness": 1, "scoreBaseSnow": 2,
                    "scoreTerrain": 1, "scoreAvalanchePenalty": {}}}"#,
                penalty
            ));
            assert!(resort.score.is_none(), "penalty {} accepted", penalty);
        }
    }

    #[test]
    fn test_decode_incomplete_breakdown_is_dropped() {
        let resort = decode(r#"{"id": "3", "shredScore": 7.2}"#);
        assert!(resort.score.is_none());
    }

    #[test]
    fn test_decode_invalid_coordinates_dropped() {
        let resort = decode(r#"{"latitude": 123.0, "longitude": 10.0}"#);
        assert!(resort.location.is_none());
    }
}
