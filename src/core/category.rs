use crate::models::MatchCategory;

/// Inclusive lower bound of the high-affinity tier
pub const HIGH_THRESHOLD: f64 = 0.75;

/// Inclusive lower bound of the medium-affinity tier
pub const MEDIUM_THRESHOLD: f64 = 0.55;

/// Map an affinity score to its discrete tier
///
/// Total over [0, 1]: the three bands partition the range and boundary
/// values map to the higher band.
#[inline]
pub fn categorize(score: f64) -> MatchCategory {
    if score >= HIGH_THRESHOLD {
        MatchCategory::High
    } else if score >= MEDIUM_THRESHOLD {
        MatchCategory::Medium
    } else {
        MatchCategory::Low
    }
}
