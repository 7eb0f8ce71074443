use super::config::{
    AVALANCHE_PENALTIES, BASE_SNOW_CAP, BASE_SNOW_SCALE_CM, FRESHNESS_CAP, FRESHNESS_SCALE_CM,
    LIFT_RATIO_SHARE, SLOPE_FACTOR_FLOOR, SNOW_CONDITION_FACTORS, TERRAIN_CAP, TERRAIN_SCALE_KM,
};
use crate::resort::AvalancheLevel;

/// `cap · (1 − e^(−value/scale))`: zero at zero, non-decreasing, never above `cap`.
/// Negative and NaN input count as zero.
fn saturating(value: f64, cap: f64, scale: f64) -> f64 {
    let value = value.max(0.0);
    cap * (1.0 - (-value / scale).exp())
}

/// Freshness component from new snow in cm.
pub fn freshness(new_snow_cm: f64) -> f64 {
    saturating(new_snow_cm, FRESHNESS_CAP, FRESHNESS_SCALE_CM)
}

/// Base-snow component from mountain snow depth in cm.
pub fn base_snow(snow_mountain_cm: f64) -> f64 {
    saturating(snow_mountain_cm, BASE_SNOW_CAP, BASE_SNOW_SCALE_CM)
}

/// Terrain component. Open slope kilometres win when reported; otherwise the
/// lift ratio earns a share of the cap; with neither the component is zero.
pub fn terrain(slopes_open_km: Option<f64>, lifts_open: Option<u32>, lifts_total: Option<u32>) -> f64 {
    if let Some(km) = slopes_open_km.filter(|km| *km > 0.0) {
        return saturating(km, TERRAIN_CAP, TERRAIN_SCALE_KM);
    }
    match (lifts_open, lifts_total) {
        (Some(open), Some(total)) if total > 0 => {
            let ratio = (f64::from(open) / f64::from(total)).clamp(0.0, 1.0);
            TERRAIN_CAP * LIFT_RATIO_SHARE * ratio
        }
        _ => 0.0,
    }
}

/// Multiplicative avalanche penalty. Unknown (0) is neutral.
pub fn avalanche_penalty(level: AvalancheLevel) -> f64 {
    AVALANCHE_PENALTIES[level.get() as usize]
}

/// Multiplicative factor for the reported snow condition. Unknown labels are neutral.
pub fn snow_factor(condition: &str) -> f64 {
    let condition = condition.trim().to_lowercase();
    SNOW_CONDITION_FACTORS
        .iter()
        .find(|(label, _)| *label == condition)
        .map_or(1.0, |(_, factor)| *factor)
}

/// Multiplicative factor for the share of slope kilometres open.
/// Neutral when either side is unreported or the total is zero.
pub fn slope_factor(slopes_open_km: Option<f64>, slopes_total_km: Option<f64>) -> f64 {
    match (slopes_open_km, slopes_total_km) {
        (Some(open), Some(total)) if total > 0.0 => {
            let ratio = (open / total).clamp(0.0, 1.0);
            SLOPE_FACTOR_FLOOR + (1.0 - SLOPE_FACTOR_FLOOR) * ratio
        }
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_freshness_zero_at_zero() {
        assert_eq!(freshness(0.0), 0.0);
    }

    #[test]
    fn test_freshness_saturates_near_thirty() {
        assert!(freshness(30.0) > 0.85 * FRESHNESS_CAP);
        assert!(freshness(200.0) <= FRESHNESS_CAP);
    }

    #[test]
    fn test_negative_input_treated_as_zero() {
        assert_eq!(freshness(-10.0), 0.0);
        assert_eq!(base_snow(-1.0), 0.0);
        assert_eq!(freshness(f64::NAN), 0.0);
    }

    #[test]
    fn test_base_snow_diminishing_returns() {
        let low_gain = base_snow(100.0) - base_snow(50.0);
        let high_gain = base_snow(500.0) - base_snow(250.0);
        assert!(high_gain < low_gain);
    }

    #[test]
    fn test_terrain_prefers_slope_km() {
        let from_km = terrain(Some(100.0), Some(1), Some(10));
        assert!((from_km - TERRAIN_CAP * (1.0 - (-1.0f64).exp())).abs() < 1e-9);
    }

    #[test]
    fn test_terrain_falls_back_to_lift_ratio() {
        assert_eq!(terrain(None, Some(5), Some(10)), TERRAIN_CAP * LIFT_RATIO_SHARE * 0.5);
        assert_eq!(terrain(Some(0.0), Some(10), Some(10)), TERRAIN_CAP * LIFT_RATIO_SHARE);
    }

    #[test]
    fn test_terrain_missing_data_is_zero() {
        assert_eq!(terrain(None, None, None), 0.0);
        assert_eq!(terrain(None, Some(4), None), 0.0);
        assert_eq!(terrain(None, Some(0), Some(0)), 0.0);
    }

    #[test]
    fn test_avalanche_penalty_table() {
        assert_eq!(avalanche_penalty(AvalancheLevel::UNKNOWN), 1.0);
        for level in 1..5 {
            let here = avalanche_penalty(AvalancheLevel::new(level));
            let next = avalanche_penalty(AvalancheLevel::new(level + 1));
            assert!(next < here, "level {} -> {}", level, level + 1);
        }
        assert!(avalanche_penalty(AvalancheLevel::new(5)) > 0.0);
    }

    #[test]
    fn test_snow_factor_labels() {
        assert_eq!(snow_factor("Pulver"), 1.0);
        assert_eq!(snow_factor(" hart "), 0.75);
        assert_eq!(snow_factor("-"), 1.0);
        assert_eq!(snow_factor("Bruchharsch"), 1.0);
    }

    #[test]
    fn test_slope_factor() {
        assert_eq!(slope_factor(Some(50.0), Some(100.0)), SLOPE_FACTOR_FLOOR + (1.0 - SLOPE_FACTOR_FLOOR) * 0.5);
        assert_eq!(slope_factor(Some(100.0), Some(100.0)), 1.0);
        assert_eq!(slope_factor(Some(10.0), None), 1.0);
        assert_eq!(slope_factor(Some(0.0), Some(0.0)), 1.0);
    }

    proptest! {
        #[test]
        fn prop_freshness_monotone_and_capped(a in 0.0f64..1000.0, b in 0.0f64..1000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(freshness(lo) <= freshness(hi));
            prop_assert!(freshness(hi) <= FRESHNESS_CAP);
            prop_assert!(freshness(lo) >= 0.0);
        }

        #[test]
        fn prop_base_snow_monotone_and_capped(a in 0.0f64..5000.0, b in 0.0f64..5000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(base_snow(lo) <= base_snow(hi));
            prop_assert!(base_snow(hi) <= BASE_SNOW_CAP);
        }

        #[test]
        fn prop_terrain_monotone_in_km(a in 0.1f64..2000.0, b in 0.1f64..2000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(terrain(Some(lo), None, None) <= terrain(Some(hi), None, None));
            prop_assert!(terrain(Some(hi), None, None) <= TERRAIN_CAP);
        }

        #[test]
        fn prop_factors_in_unit_range(open in 0.0f64..500.0, total in 0.0f64..500.0) {
            let factor = slope_factor(Some(open), Some(total));
            prop_assert!((0.0..=1.0).contains(&factor));
        }
    }
}
