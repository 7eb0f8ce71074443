use chrono::NaiveDateTime;
use serde::Deserialize;

use super::wire::RawResort;

/// Operating status as reported by the resort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingStatus {
    Open,
    Closed,
    PartiallyOpen,
}

impl OperatingStatus {
    /// Parse a status label. Accepts the English variant names and the German
    /// labels used by bergfex-style feeds. Empty input reads as `Closed`; any
    /// other unrecognised text as `PartiallyOpen`.
    pub fn parse(s: &str) -> Self {
        let s = s.trim().to_lowercase();
        if s.is_empty() {
            return OperatingStatus::Closed;
        }
        match s.as_str() {
            "open" | "geöffnet" | "offen" => OperatingStatus::Open,
            "closed" | "geschlossen" => OperatingStatus::Closed,
            _ => OperatingStatus::PartiallyOpen,
        }
    }

    /// True unless the resort is fully closed
    pub fn is_operating(self) -> bool {
        !matches!(self, OperatingStatus::Closed)
    }

    pub fn label(self) -> &'static str {
        match self {
            OperatingStatus::Open => "Open",
            OperatingStatus::Closed => "Closed",
            OperatingStatus::PartiallyOpen => "Partially open",
        }
    }
}

/// Avalanche warning level on the five-step European scale.
///
/// Level 0 is a sentinel for "no data" and never a risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AvalancheLevel(u8);

impl AvalancheLevel {
    pub const UNKNOWN: AvalancheLevel = AvalancheLevel(0);
    pub const MAX: u8 = 5;

    /// Build a level from a raw integer, clamping into `0..=5`.
    pub fn new(level: i64) -> Self {
        AvalancheLevel(level.clamp(0, Self::MAX as i64) as u8)
    }

    /// Parse a textual warning such as `"III"`, `"3 - Erheblich"` or `"Stufe 2"`.
    ///
    /// Roman numerals are checked first. A digit anywhere in the text is
    /// clamped to `1..=5`, since a textual warning always names a real level.
    pub fn parse(s: &str) -> Self {
        let lowered = s.trim().to_lowercase();
        let first = lowered
            .split(|c: char| c.is_whitespace() || c == '-')
            .next()
            .unwrap_or("");
        let roman = match first {
            "i" => Some(1),
            "ii" => Some(2),
            "iii" => Some(3),
            "iv" => Some(4),
            "v" => Some(5),
            _ => None,
        };
        if let Some(level) = roman {
            return AvalancheLevel(level);
        }
        lowered
            .chars()
            .find_map(|c| c.to_digit(10))
            .map(|d| AvalancheLevel((d as u8).clamp(1, Self::MAX)))
            .unwrap_or(Self::UNKNOWN)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_known(self) -> bool {
        self.0 > 0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Low",
            2 => "Moderate",
            3 => "Considerable",
            4 => "High",
            5 => "Very high",
            _ => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Altitude {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting coordinates outside the valid ranges
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        valid.then_some(GeoPoint {
            latitude,
            longitude,
        })
    }
}

/// Derived Shred Score and the components it was built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShredScoreBreakdown {
    pub freshness: f64,
    pub base_snow: f64,
    pub terrain: f64,
    pub avalanche_penalty: f64,
    pub snow_factor: f64,
    pub slope_factor: f64,
    pub shred_score: f64,
}

/// One resort's reported conditions at a point in time.
///
/// Deserialises leniently from the `/api/resorts` wire format: malformed
/// optional numbers become "unreported", negative depths clamp to zero and
/// open counts never exceed their totals.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawResort")]
pub struct ResortSnapshot {
    pub id: String,
    pub name: String,
    pub region: String,
    pub country: String,
    pub status: OperatingStatus,
    pub snow_valley: f64,
    pub snow_mountain: f64,
    pub new_snow: f64,
    pub snow_condition: String,
    pub last_snowfall: Option<String>,
    pub avalanche_warning: AvalancheLevel,
    pub lifts_open: Option<u32>,
    pub lifts_total: Option<u32>,
    pub slopes_open_km: Option<f64>,
    pub slopes_total_km: Option<f64>,
    pub slopes_open: Option<u32>,
    pub slopes_total: Option<u32>,
    pub slope_condition: Option<String>,
    pub altitude: Option<Altitude>,
    pub location: Option<GeoPoint>,
    pub last_update: Option<NaiveDateTime>,
    pub url: String,
    pub score: Option<ShredScoreBreakdown>,
}

impl ResortSnapshot {
    /// Open/total lifts, only when both sides are reported and the total is non-zero
    pub fn lift_ratio(&self) -> Option<(u32, u32)> {
        match (self.lifts_open, self.lifts_total) {
            (Some(open), Some(total)) if total > 0 => Some((open, total)),
            _ => None,
        }
    }

    /// Open/total slope kilometres, with the same rules as [`Self::lift_ratio`]
    pub fn slope_km_ratio(&self) -> Option<(f64, f64)> {
        match (self.slopes_open_km, self.slopes_total_km) {
            (Some(open), Some(total)) if total > 0.0 => Some((open, total)),
            _ => None,
        }
    }

    pub fn shred_score(&self) -> Option<f64> {
        self.score.map(|s| s.shred_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_german_labels() {
        assert_eq!(OperatingStatus::parse("Geöffnet"), OperatingStatus::Open);
        assert_eq!(OperatingStatus::parse("Geschlossen"), OperatingStatus::Closed);
        assert_eq!(
            OperatingStatus::parse("Teilweise geöffnet"),
            OperatingStatus::PartiallyOpen
        );
    }

    #[test]
    fn test_status_parse_fallbacks() {
        assert_eq!(OperatingStatus::parse(""), OperatingStatus::Closed);
        assert_eq!(OperatingStatus::parse("  "), OperatingStatus::Closed);
        assert_eq!(OperatingStatus::parse("Open"), OperatingStatus::Open);
        assert_eq!(OperatingStatus::parse("weekend only"), OperatingStatus::PartiallyOpen);
    }

    #[test]
    fn test_is_operating() {
        assert!(OperatingStatus::Open.is_operating());
        assert!(OperatingStatus::PartiallyOpen.is_operating());
        assert!(!OperatingStatus::Closed.is_operating());
    }

    #[test]
    fn test_avalanche_new_clamps() {
        assert_eq!(AvalancheLevel::new(-3).get(), 0);
        assert_eq!(AvalancheLevel::new(3).get(), 3);
        assert_eq!(AvalancheLevel::new(9).get(), 5);
    }

    #[test]
    fn test_avalanche_parse_roman() {
        assert_eq!(AvalancheLevel::parse("III").get(), 3);
        assert_eq!(AvalancheLevel::parse("iv - Groß").get(), 4);
        assert_eq!(AvalancheLevel::parse("V").get(), 5);
    }

    #[test]
    fn test_avalanche_parse_digits() {
        assert_eq!(AvalancheLevel::parse("Stufe 2").get(), 2);
        assert_eq!(AvalancheLevel::parse("7").get(), 5);
        assert_eq!(AvalancheLevel::parse("0").get(), 1);
        assert_eq!(AvalancheLevel::parse("keine").get(), 0);
        assert!(!AvalancheLevel::parse("").is_known());
    }

    #[test]
    fn test_avalanche_labels() {
        assert_eq!(AvalancheLevel::UNKNOWN.label(), "-");
        assert_eq!(AvalancheLevel::new(3).label(), "Considerable");
    }

    #[test]
    fn test_geo_point_rejects_out_of_range() {
        assert!(GeoPoint::new(47.1, 10.2).is_some());
        assert!(GeoPoint::new(91.0, 10.2).is_none());
        assert!(GeoPoint::new(47.1, -181.0).is_none());
    }
}
