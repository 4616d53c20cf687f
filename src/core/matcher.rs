use std::cmp::Ordering;
use std::sync::Arc;

use thiserror::Error;

use crate::core::{category::categorize, scoring::calculate_affinity_score};
use crate::models::{MemberProfile, ScoredMatch, ScoringWeights};
use crate::services::{EmbeddingClient, EmbeddingError, ReasonEngine, VectorStoreClient, VectorStoreError};

/// Fatal failures of the ranking pipeline
///
/// Reason generation is absent here on purpose: it degrades to fallback text
/// inside [`ReasonEngine`] and never aborts a request.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(#[from] EmbeddingError),

    #[error("Candidate retrieval failed: {0}")]
    RetrievalFailed(#[from] VectorStoreError),
}

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<ScoredMatch>,
    pub total_candidates: usize,
}

/// Main matching orchestrator - runs the retrieve-score-explain pipeline
///
/// # Pipeline Stages
/// 1. Embed the source profile (reused when already attached)
/// 2. Nearest-neighbour retrieval with one extra slot for the self hit
/// 3. Self-exclusion by member id
/// 4. Affinity scoring, reason generation, categorization per candidate
/// 5. Ranking and truncation to the requested limit
#[derive(Clone)]
pub struct Matcher {
    embeddings: Arc<EmbeddingClient>,
    vectors: Arc<VectorStoreClient>,
    reasons: Arc<ReasonEngine>,
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(
        embeddings: Arc<EmbeddingClient>,
        vectors: Arc<VectorStoreClient>,
        reasons: Arc<ReasonEngine>,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            embeddings,
            vectors,
            reasons,
            weights,
        }
    }

    /// Find the best matches for a member profile
    ///
    /// # Arguments
    /// * `profile` - The member looking for connections
    /// * `limit` - Maximum number of matches to return
    ///
    /// # Returns
    /// MatchResult with matches ranked by affinity score, or a [`MatchError`]
    /// when the embedding or retrieval backends are unreachable.
    pub async fn find_matches(
        &self,
        profile: &MemberProfile,
        limit: usize,
    ) -> Result<MatchResult, MatchError> {
        let embedding = match &profile.embedding {
            Some(vector) => vector.clone(),
            None => self.embeddings.embed_profile(profile).await?,
        };

        // One extra slot: the member's own point usually comes back first
        let hits = self.vectors.search(&embedding, limit + 1).await?;
        let total_candidates = hits.len();

        tracing::debug!(
            "Retrieved {} candidates for member {}",
            total_candidates,
            profile.member_id
        );

        let mut matches: Vec<ScoredMatch> = Vec::with_capacity(hits.len());

        for hit in hits {
            if hit.member_id == profile.member_id {
                continue;
            }

            let score =
                calculate_affinity_score(profile, &hit.payload, hit.score, &self.weights);
            let reasons = self.reasons.generate_reasons(profile, &hit.payload).await;
            let category = categorize(score);

            matches.push(ScoredMatch {
                member_id: profile.member_id.clone(),
                matched_member_id: hit.member_id,
                matched_name: hit.payload.name,
                matched_company: hit.payload.company,
                affinity_score: score,
                reasons,
                category,
            });
        }

        rank_matches(&mut matches, limit);

        Ok(MatchResult {
            matches,
            total_candidates,
        })
    }
}

/// Sort matches by affinity score (descending) and truncate to `limit`
///
/// The sort is stable, so candidates with equal scores keep their retrieval
/// order. NaN never occurs because scores are clamped to [0.0, 1.0].
pub fn rank_matches(matches: &mut Vec<ScoredMatch>, limit: usize) {
    matches.sort_by(|a, b| {
        b.affinity_score
            .partial_cmp(&a.affinity_score)
            .unwrap_or(Ordering::Equal)
    });
    matches.truncate(limit);
}
