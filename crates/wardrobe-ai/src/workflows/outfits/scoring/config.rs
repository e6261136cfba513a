use serde::{Deserialize, Serialize};

/// Tunable constants of the style scorers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Multiplier applied to Streetwear darkness when an item falls in the dark range.
    pub streetwear_dark_boost: f64,
    /// Weight on the Sandwich bottom contrast score.
    pub sandwich_bottom_weight: f64,
    /// Seed for the Random style; `None` draws one from the thread RNG.
    pub random_seed: Option<u64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            streetwear_dark_boost: 1.5,
            sandwich_bottom_weight: 1.0,
            random_seed: None,
        }
    }
}
