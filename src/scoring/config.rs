use serde::{Deserialize, Serialize};

/// Upper bound of the freshness component (new snow).
pub const FRESHNESS_CAP: f64 = 4.0;
/// New snow (cm) at which freshness reaches ~63% of its cap; ~86% at 30cm.
pub const FRESHNESS_SCALE_CM: f64 = 15.0;

/// Upper bound of the base-snow component (mountain depth).
pub const BASE_SNOW_CAP: f64 = 4.0;
/// Mountain depth (cm) at which base snow reaches ~63% of its cap; ~92% at 200cm.
pub const BASE_SNOW_SCALE_CM: f64 = 80.0;

/// Upper bound of the terrain component.
pub const TERRAIN_CAP: f64 = 2.0;
/// Open slope length (km) at which terrain reaches ~63% of its cap.
pub const TERRAIN_SCALE_KM: f64 = 100.0;
/// Share of the terrain cap reachable from the lift ratio alone, used when
/// slope length is not reported.
pub const LIFT_RATIO_SHARE: f64 = 0.5;

/// Multiplicative penalty per avalanche level. Index 0 is "no data".
pub const AVALANCHE_PENALTIES: [f64; 6] = [1.0, 1.0, 0.95, 0.85, 0.65, 0.4];

/// Slope factor for a resort with zero of its reported kilometres open.
pub const SLOPE_FACTOR_FLOOR: f64 = 0.6;

/// Snow factor per snow-condition label. Unlisted labels are neutral (1.0).
pub const SNOW_CONDITION_FACTORS: &[(&str, f64)] = &[
    ("pulver", 1.0),
    ("powder", 1.0),
    ("griffig", 0.95),
    ("packed", 0.95),
    ("firn", 0.9),
    ("spring", 0.9),
    ("kunstschnee", 0.85),
    ("artificial", 0.85),
    ("sulz", 0.8),
    ("slush", 0.8),
    ("hart", 0.75),
    ("hard", 0.75),
    ("eisig", 0.7),
    ("icy", 0.7),
];

pub const MAX_SCORE: f64 = 10.0;

/// Weights of the three additive Shred Score components.
///
/// The weighted sum is multiplied by the avalanche, snow and slope factors
/// and clamped to `0..=10`, so the weights need not sum to one. Raising a
/// weight makes that component dominate the ranking; zero removes it.
///
/// Reference ranking with the defaults: a resort with 35cm new snow, 210cm
/// base, 138km open and avalanche level 3 scores ~7.50 (raw ~8.82 × 0.85);
/// one with 5cm, 85cm, 35km and level 1 scores ~4.34. The level-3 penalty
/// would have to drop below ~0.49 before the second overtook the first.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   freshness_weight: 1.5
///   base_snow_weight: 1.0
///   terrain_weight: 0.5
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ScoreWeights {
    /// Weight of the new-snow component (default: 1.0)
    pub freshness_weight: f64,

    /// Weight of the mountain snow depth component (default: 1.0)
    pub base_snow_weight: f64,

    /// Weight of the open terrain component (default: 1.0)
    pub terrain_weight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            freshness_weight: 1.0,
            base_snow_weight: 1.0,
            terrain_weight: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = ScoreWeights::default();
        assert_eq!(weights.freshness_weight, 1.0);
        assert_eq!(weights.base_snow_weight, 1.0);
        assert_eq!(weights.terrain_weight, 1.0);
    }

    #[test]
    fn test_caps_fill_the_score_range() {
        assert_eq!(FRESHNESS_CAP + BASE_SNOW_CAP + TERRAIN_CAP, MAX_SCORE);
    }

    #[test]
    fn test_weights_serde_roundtrip() {
        let weights = ScoreWeights {
            freshness_weight: 1.5,
            base_snow_weight: 0.8,
            terrain_weight: 0.0,
        };
        let yaml = serde_saphyr::to_string(&weights).unwrap();
        let parsed: ScoreWeights = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(weights, parsed);
    }

    #[test]
    fn test_partial_weights_parse() {
        let yaml = "freshness_weight: 2.0\n";
        let weights: ScoreWeights = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(weights.freshness_weight, 2.0);
        assert_eq!(weights.base_snow_weight, 1.0);
        assert_eq!(weights.terrain_weight, 1.0);
    }

    #[test]
    fn test_unknown_weight_rejected() {
        let yaml = "powder_weight: 2.0\n";
        assert!(serde_saphyr::from_str::<ScoreWeights>(yaml).is_err());
    }
}
