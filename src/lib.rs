//! Nexo Algo - High-performance affinity matching service for the Nexo
//! entrepreneur community
//!
//! This library provides the matching engine used by the Nexo platform. It
//! embeds member profiles, retrieves nearest neighbours from a vector index,
//! and blends semantic similarity with attribute and need/offer signals into
//! a ranked, categorized, explained match list.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MatchError, MatchResult, Matcher};
pub use crate::models::{
    CandidatePayload, FindMatchesRequest, FindMatchesResponse, MatchCategory, MemberProfile,
    ScoredMatch, ScoringWeights,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let category = crate::core::categorize(0.8);
        assert_eq!(category, MatchCategory::High);
    }
}
