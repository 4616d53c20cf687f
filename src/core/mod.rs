// Core algorithm exports
pub mod category;
pub mod matcher;
pub mod scoring;

pub use category::{categorize, HIGH_THRESHOLD, MEDIUM_THRESHOLD};
pub use matcher::{rank_matches, MatchError, MatchResult, Matcher};
pub use scoring::{calculate_affinity_score, complementarity};
