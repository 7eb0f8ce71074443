use super::config::ScoreWeights;

/// Validate score weights at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_weights(weights: &ScoreWeights) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let named = [
        ("freshness_weight", weights.freshness_weight),
        ("base_snow_weight", weights.base_snow_weight),
        ("terrain_weight", weights.terrain_weight),
    ];

    for (name, value) in named {
        if !value.is_finite() {
            errors.push(format!("scoring.{}: must be a finite number", name));
        } else if value < 0.0 {
            errors.push(format!("scoring.{}: must be non-negative (got {})", name, value));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
