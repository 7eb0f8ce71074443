pub mod config;
pub mod engine;
pub mod factors;
pub mod validation;

pub use config::ScoreWeights;
pub use engine::{compute_score, ensure_scored, score_all, ScoreSource, ScoringStats};
pub use validation::validate_weights;
