use log::debug;

use super::config::{ScoreWeights, MAX_SCORE};
use super::factors;
use crate::resort::{ResortSnapshot, ShredScoreBreakdown};

/// Where a resort's score came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSource {
    Server,
    Computed,
}

/// Counts from scoring a whole collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringStats {
    pub from_server: usize,
    pub computed: usize,
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, MAX_SCORE)
    }
}

/// Compute the Shred Score breakdown for one resort. Pure; never fails.
pub fn compute_score(resort: &ResortSnapshot, weights: &ScoreWeights) -> ShredScoreBreakdown {
    let freshness = factors::freshness(resort.new_snow);
    let base_snow = factors::base_snow(resort.snow_mountain);
    let terrain = factors::terrain(resort.slopes_open_km, resort.lifts_open, resort.lifts_total);
    let avalanche_penalty = factors::avalanche_penalty(resort.avalanche_warning);
    let snow_factor = factors::snow_factor(&resort.snow_condition);
    let slope_factor = factors::slope_factor(resort.slopes_open_km, resort.slopes_total_km);

    // NaN weights collapse to zero through f64::max
    let weighted = weights.freshness_weight.max(0.0) * freshness
        + weights.base_snow_weight.max(0.0) * base_snow
        + weights.terrain_weight.max(0.0) * terrain;

    ShredScoreBreakdown {
        freshness,
        base_snow,
        terrain,
        avalanche_penalty,
        snow_factor,
        slope_factor,
        shred_score: clamp_score(weighted * avalanche_penalty * snow_factor * slope_factor),
    }
}

/// Make sure `resort` carries a score.
///
/// A server-provided breakdown is kept with its score clamped into range.
/// A non-finite server score is discarded and the resort is scored locally.
pub fn ensure_scored(resort: &mut ResortSnapshot, weights: &ScoreWeights) -> ScoreSource {
    if let Some(score) = resort.score.as_mut() {
        if score.shred_score.is_finite() {
            score.shred_score = clamp_score(score.shred_score);
            return ScoreSource::Server;
        }
        debug!("Discarding non-finite server score for resort {}", resort.id);
    }
    resort.score = Some(compute_score(resort, weights));
    ScoreSource::Computed
}

/// Score every resort in place that does not carry a usable score yet.
pub fn score_all(resorts: &mut [ResortSnapshot], weights: &ScoreWeights) -> ScoringStats {
    let mut stats = ScoringStats::default();
    for resort in resorts.iter_mut() {
        match ensure_scored(resort, weights) {
            ScoreSource::Server => stats.from_server += 1,
            ScoreSource::Computed => stats.computed += 1,
        }
    }
    debug!(
        "Scored {} resorts ({} from server, {} computed)",
        resorts.len(),
        stats.from_server,
        stats.computed
    );
    stats
}
